/// Business logic layer
///
/// Services own the rules; handlers own the HTTP shapes; repositories own
/// the SQL. Services are cheap to construct and are built per request from
/// shared state, the same way the handlers consume them.
pub mod feed;
pub mod graph;
pub mod identity;
pub mod messaging;
pub mod notifications;
pub mod posts;
pub mod stories;

pub use feed::FeedService;
pub use graph::{ConnectionOutcome, GraphService};
pub use identity::IdentityService;
pub use messaging::MessageService;
pub use notifications::{NotificationRefs, NotificationService};
pub use posts::{LikeState, PostService};
pub use stories::StoryService;
