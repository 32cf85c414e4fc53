pub(crate) mod bootstrap;
