//! Static companion data: poses, keyword hints and canned replies.
//!
//! A [`Catalog`] is built once at startup and shared read-only by every
//! session.

mod keywords;
mod poses;
mod replies;

use tracing::warn;

use crate::error::ServiceResult;

pub use keywords::KeywordTable;
pub use poses::{BodyAnimation, HeadAnimation, Limbs, Point, PoseDescriptor, PoseTable, names};
pub use replies::ReplySource;

/// First transcript message of every session
pub const DEFAULT_GREETING: &str = "Hey! Walk in and tell me about your day. I'm all ears 👓";
/// Bubble shown once the walk-in finishes
pub const DEFAULT_WELCOME_BUBBLE: &str = "hey! 👋";
/// Caption shown before the figure has arrived
pub const ARRIVING_CAPTION: &str = "walk on in...";

#[derive(Debug, Clone)]
pub struct Catalog {
    pub poses: PoseTable,
    pub keywords: KeywordTable,
    pub replies: ReplySource,
    pub greeting: String,
    pub welcome_bubble: String,
}

impl Catalog {
    pub fn new(poses: PoseTable, keywords: KeywordTable, replies: ReplySource) -> Self {
        Self {
            poses,
            keywords,
            replies,
            greeting: DEFAULT_GREETING.to_string(),
            welcome_bubble: DEFAULT_WELCOME_BUBBLE.to_string(),
        }
    }

    /// Built-in data set. Fails only if the reply rotation is empty.
    pub fn builtin() -> ServiceResult<Self> {
        Ok(Self::new(
            PoseTable::builtin(),
            KeywordTable::builtin(),
            ReplySource::builtin()?,
        ))
    }

    /// Pose names referenced by replies, keyword entries or the controller
    /// that the pose table does not define. Lookups of these resolve to idle.
    pub fn dangling_pose_references(&self) -> Vec<String> {
        let controller = [names::NODDING, names::STRETCHING, names::WALKING];
        let mut missing: Vec<String> = Vec::new();
        let referenced = self
            .replies
            .iter()
            .map(|r| r.pose.as_str())
            .chain(self.keywords.entries().iter().map(|e| e.pose.as_str()))
            .chain(controller);
        for name in referenced {
            if !self.poses.contains(name) && !missing.iter().any(|m| m == name) {
                missing.push(name.to_string());
            }
        }
        missing
    }

    /// Log every dangling pose reference
    pub fn warn_dangling(&self) {
        for name in self.dangling_pose_references() {
            warn!(pose = %name, "Pose referenced but not defined; it will render as idle");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::replies::ReplyRecord;
    use super::*;

    #[test]
    fn test_builtin_catalog_is_closed() {
        let catalog = Catalog::builtin().unwrap();
        assert!(catalog.dangling_pose_references().is_empty());
    }

    #[test]
    fn test_dangling_references_reported_once() {
        let replies = ReplySource::new(vec![
            ReplyRecord::new("a", "dancing", "a"),
            ReplyRecord::new("b", "dancing", "b"),
        ])
        .unwrap();
        let keywords = KeywordTable::new([("moonwalk", vec!["smooth"])]);
        let catalog = Catalog::new(PoseTable::builtin(), keywords, replies);
        assert_eq!(
            catalog.dangling_pose_references(),
            vec!["dancing".to_string(), "moonwalk".to_string()]
        );
    }
}
