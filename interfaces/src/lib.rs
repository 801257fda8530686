pub mod defs;

pub use defs::{Article, ArticleSource, InterestPoint, ProfileUpdate, SurveyQuestion, User, PLACEHOLDER_IMAGE};
