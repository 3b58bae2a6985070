pub(crate) mod compute;
pub(crate) mod door_tags;
pub(crate) mod entries;
pub(crate) mod poster;
