pub mod bitbucket;
pub mod slack;
