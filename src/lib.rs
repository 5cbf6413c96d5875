//! Roster: employee and qualification client
//!
//! Keeps an employee roster consistent with a qualification catalog served
//! by a REST backend. The library holds the reconciliation engine, the local
//! query engine and the mutation coordinator; the `roster` binary is a
//! terminal front end on top of them.

pub mod cli;
pub mod core;
pub mod entities;
