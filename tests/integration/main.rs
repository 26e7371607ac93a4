//! Integration tests for the slip engine.

mod http_channel;
mod mock_channel;
