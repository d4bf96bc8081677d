//! Each module contains `impl Database` blocks for a specific table.

mod notes;
