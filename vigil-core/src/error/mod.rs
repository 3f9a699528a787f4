/*
 *     Copyright 2025 The Vigil Authors
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *      http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

pub mod errors;

pub use errors::ErrorType;
pub use errors::ExternalError;
pub use errors::Message;
pub use errors::OrErr;

// VigilError is the error for the vigil toolkit.
#[derive(thiserror::Error, Debug)]
pub enum VigilError {
    // IO is the error for IO operation.
    #[error(transparent)]
    IO(#[from] std::io::Error),

    // ReqwestError is the error for reqwest.
    #[error(transparent)]
    ReqwestError(#[from] reqwest::Error),

    // URLParse is the error for url parse.
    #[error(transparent)]
    URLParse(#[from] url::ParseError),

    // NotDirectory is the error when the path is not a directory.
    #[error{"{0} is not a directory"}]
    NotDirectory(String),

    // CpuUnavailable is the error when no cpu usage can be read.
    #[error{"cpu usage unavailable"}]
    CpuUnavailable,

    // ExternalError is the error for external error.
    #[error(transparent)]
    ExternalError(#[from] ExternalError),

    // Unknown is the error when the error is unknown.
    #[error("unknown {0}")]
    Unknown(String),
}
