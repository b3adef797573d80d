//! One file per group of insertion modes. Each adds `handle_*` methods to
//! [`TreeConstructor`](super::TreeConstructor).

mod after;
mod foreign;
mod in_body;
mod in_head;
mod in_select;
mod in_table;
mod initial;
