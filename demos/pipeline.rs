//! Synchronous pipeline walkthrough: transforms, partition, phases, topics.
//!
//! Run with: `cargo run --example pipeline`
//! Set `RUST_LOG=info` to see halts being swallowed.

use eventflow::{
    create_event, create_listener, create_mutation_listener, create_partition, create_topic,
    halt, with_scope,
};
use serde_json::json;

fn main() {
    env_logger::init();

    let (emitters, scope) = with_scope(|| {
        let (on, emit) = create_event::<String>();

        // Validation stage: short words halt here.
        let valid = on.subscribe(|word: String| {
            if word.len() < 3 {
                return halt("too short");
            }
            Ok(word)
        });

        let (greetings, other) = create_partition(&valid, |word| word.starts_with("hello"));

        create_mutation_listener(&valid, |word| println!("[mutation] accepted: {word}"));
        create_listener(&greetings, |word| println!("[listener] greeting: {word}"));
        create_listener(&other, |word| println!("[listener] other: {word}"));

        // Keyed routing: one subscriber per level of the tree.
        let (topic, emit_topic) = create_topic();
        let user = topic.at("user");
        create_listener(&user.handler(), |v| println!("[topic] user: {v}"));
        create_listener(&user.at("name").handler(), |v| println!("[topic] user.name: {v}"));

        (emit, emit_topic)
    });
    let (emit, emit_topic) = emitters;

    emit.emit("hello world".into());
    emit.emit("hi".into()); // halted by validation
    emit.emit("event composition".into());

    emit_topic.emit(&["user", "name"], json!("ada"));
    emit_topic.emit(&[], json!({"user": {"name": "grace"}}));

    scope.dispose();
    emit.emit("after teardown".into()); // reaches no one
}
