// Copyright (c) 2023 Graphcore Ltd. All rights reserved.

use std::rc::Rc;

use epon_track::entity::{Entity, toplevel};
use epon_track::test_helpers::create_tracker;

/// Create the top-level entity for a test, logging to a file named after the
/// test source file.
#[must_use]
pub fn start_test(full_filepath: &str) -> Rc<Entity> {
    toplevel(&create_tracker(full_filepath), "top")
}
