//! Collaborator implementations backed by remote services

pub mod gitlab;
pub mod listing;

pub use gitlab::GitLabSource;
pub use listing::ListingPageRepository;
