// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Type definitions for API requests and responses.

mod request;
mod response;

pub use request::{LayoutRequest, MeshOptions, PredictOptions};
pub use response::{LayoutResponse, PredictResponse, ProcessingStats};
