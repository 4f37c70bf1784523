pub(crate) mod thumbnail;
