pub mod defs;

pub use defs::{
    Candidate, Category, GeneratedArticle, ImageRef, NewPost, Post, SourceKind, UnknownCategory,
};
