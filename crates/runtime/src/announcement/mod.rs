//! Announcements: validated records, signing, and outbound construction.

mod builder;
mod signing;
mod types;

pub use builder::{AnnouncementBuilder, AnnouncementKind, DraftPost, DraftProfile, content_path};
pub use signing::{AnnouncementSigner, KeyringSigner};
pub use types::{
    Announcement, AnnouncementRow, InvalidAnnouncement, Signature, UnsignedAnnouncement,
    announcement_uri,
};
