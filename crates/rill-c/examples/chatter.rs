// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Two independent channels on one topic: a talker publishing records and a
//! listener polling them.
//!
//! Run with: `cargo run -p rill-c --example chatter`

use std::thread;
use std::time::Duration;

use rill_c::{Channel, ChannelConfig};

fn main() {
    let talker = Channel::open(ChannelConfig::new("demo/chatter")).expect("open talker");
    let listener = Channel::open(ChannelConfig::new("demo/chatter")).expect("open listener");

    let producer = thread::spawn(move || {
        for index in 0..10u32 {
            talker
                .write(index, &format!("hello #{index}"))
                .expect("write");
            thread::sleep(Duration::from_millis(50));
        }
    });

    let mut received = 0;
    while received < 10 {
        match listener.take().expect("take") {
            Some(record) => {
                println!("[{}] {}", record.index, record.message);
                received += 1;
            }
            None => thread::sleep(Duration::from_millis(10)),
        }
    }

    producer.join().expect("producer thread");
}
