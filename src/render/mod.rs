pub(crate) mod door_tags;
pub(crate) mod poster;
