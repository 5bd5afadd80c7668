//! Small pure helpers shared by the services.

pub mod slug;
