//! Application use cases / business logic

pub mod login;
pub mod posts;
pub mod social;
pub mod startup;

pub use login::{LoginError, LoginUseCase};
pub use posts::{PostDraft, PostsUseCase};
pub use social::{FollowError, SocialGraphUseCase};
pub use startup::{StartupError, wait_until_ready};
