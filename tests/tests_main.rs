#[path = "helpers/mod.rs"]
mod helpers;

#[path = "index/mod.rs"]
mod index;

#[path = "rewrite/mod.rs"]
mod rewrite;

#[path = "ide/mod.rs"]
mod ide;

#[path = "project/mod.rs"]
mod project;
