// Selection cascade: brand → model → engine state, transitions and publication.

pub mod controller;
pub mod level;
pub mod publisher;
pub mod quick_filter;
pub mod selection;
pub mod transitions;
