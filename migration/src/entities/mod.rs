pub mod article;
pub mod engagement_record;
pub mod profile;
pub mod recommendation_log;
pub mod user_interaction;

pub use article::Entity as ArticleEntity;
pub use engagement_record::Entity as EngagementRecordEntity;
pub use profile::Entity as ProfileEntity;
pub use recommendation_log::Entity as RecommendationLogEntity;
pub use user_interaction::Entity as UserInteractionEntity;
