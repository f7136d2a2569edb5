//! Tests for the application layer: binder, coordinator, attachments,
//! and session, run against mock ports and real caches.


mod coordinator_tests;
