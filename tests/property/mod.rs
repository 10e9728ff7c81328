// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-based test modules

mod snapshot_grouping;
mod upsert_semantics;
