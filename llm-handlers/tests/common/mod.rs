#![allow(dead_code)]

pub mod mock_bot;
pub mod mock_llm;
