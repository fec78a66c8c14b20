pub mod auth;
pub mod categories;
pub mod documents;
pub mod mailer;
pub mod markdown;
pub mod messages;
pub mod posts;
pub mod settings;
pub mod slug;
pub mod uploads;
