pub mod stream_chat;
