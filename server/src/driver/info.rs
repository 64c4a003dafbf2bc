// Rolodex
// Copyright 2023 Julio Merino
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License.  You may obtain a copy
// of the License at:
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.  See the
// License for the specific language governing permissions and limitations
// under the License.

//! Operations on the static information record.

use crate::driver::Driver;
use crate::model::Info;
use rolodex_core::driver::DriverResult;

impl Driver {
    /// Gets the static information record.
    pub(crate) async fn get_info(self) -> DriverResult<Info> {
        Ok(Info::new("test", vec![1, 2, 3]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::testutils::*;

    #[tokio::test]
    async fn test_get_info() {
        let context = TestContext::setup().await;

        let info = context.driver().get_info().await.unwrap();
        assert_eq!("test", info.item());
        assert_eq!(&[1, 2, 3], info.result().as_slice());
    }
}
