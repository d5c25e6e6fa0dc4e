//! Grammar productions for the query language.
//!
//! Every `parse_*` method is an extension of `Parser`.

mod atoms;
mod expressions;
mod items;
mod predicates;
mod structures;
