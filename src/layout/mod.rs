pub(crate) mod slots;
