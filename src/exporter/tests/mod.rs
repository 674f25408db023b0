use super::test_helpers::*;
use super::*;
use crate::error::Error;
use crate::sink::MemorySink;
use crate::store::MemoryPage;
use serde_json::json;
