// SPDX-License-Identifier: Apache-2.0 OR MIT

// End-to-end intra-process delivery through the public API: participants,
// publishers/subscribers, typed writers/readers, liveliness tags.

use rill::{cdr, DdsType, History, InstanceState, Participant, QoS, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
struct Blip {
    value: u32,
    label: String,
}

impl DdsType for Blip {
    fn type_name() -> &'static str {
        "Blip"
    }

    fn encode_cdr(&self, buf: &mut Vec<u8>) -> Result<()> {
        cdr::put_u32(buf, self.value);
        cdr::put_string(buf, &self.label);
        Ok(())
    }

    fn decode_cdr(buf: &[u8]) -> Result<Self> {
        let mut pos = 0;
        let value = cdr::get_u32(buf, &mut pos)?;
        let label = cdr::get_string(buf, &mut pos)?;
        Ok(Blip { value, label })
    }
}

fn entity_pair(
    participant: &std::sync::Arc<Participant>,
    topic_name: &str,
    qos: QoS,
) -> (rill::DataWriter<Blip>, rill::DataReader<Blip>) {
    let topic = participant.create_topic::<Blip>(topic_name).unwrap();
    let publisher = participant.create_publisher(qos.clone()).unwrap();
    let writer = publisher.create_writer(&topic).unwrap();
    let subscriber = participant.create_subscriber(qos).unwrap();
    let reader = subscriber.create_reader(&topic).unwrap();
    (writer, reader)
}

#[test]
fn same_participant_roundtrip() {
    let participant = Participant::builder("it_same").domain_id(10).build().unwrap();
    participant.register_type::<Blip>().unwrap();
    let (writer, reader) = entity_pair(&participant, "it/same/roundtrip", QoS::default());

    writer
        .write(&Blip {
            value: 42,
            label: "answer".to_string(),
        })
        .unwrap();

    let sample = reader.take_next_sample().unwrap().expect("sample pending");
    assert_eq!(sample.data.value, 42);
    assert_eq!(sample.data.label, "answer");
    assert_eq!(sample.info.instance_state, InstanceState::Alive);
    assert_eq!(sample.info.sequence, 1);

    assert!(reader.take_next_sample().unwrap().is_none());
}

#[test]
fn cross_participant_roundtrip() {
    let talker = Participant::builder("it_talker").domain_id(11).build().unwrap();
    let listener = Participant::builder("it_listener").domain_id(11).build().unwrap();
    talker.register_type::<Blip>().unwrap();
    listener.register_type::<Blip>().unwrap();

    let pub_topic = talker.create_topic::<Blip>("it/cross/chatter").unwrap();
    let publisher = talker.create_publisher(QoS::default()).unwrap();
    let writer = publisher.create_writer(&pub_topic).unwrap();

    let sub_topic = listener.create_topic::<Blip>("it/cross/chatter").unwrap();
    let subscriber = listener.create_subscriber(QoS::default()).unwrap();
    let reader = subscriber.create_reader(&sub_topic).unwrap();

    assert_eq!(writer.matched_readers(), 1);

    writer
        .write(&Blip {
            value: 7,
            label: "hi".to_string(),
        })
        .unwrap();

    let sample = reader.take_next_sample().unwrap().expect("cross delivery");
    assert_eq!(sample.data.value, 7);
}

#[test]
fn reader_first_binding_order() {
    let participant = Participant::builder("it_order").domain_id(12).build().unwrap();
    participant.register_type::<Blip>().unwrap();
    let topic = participant.create_topic::<Blip>("it/order/topic").unwrap();

    // Reader exists before any writer
    let subscriber = participant.create_subscriber(QoS::default()).unwrap();
    let reader = subscriber.create_reader(&topic).unwrap();

    let publisher = participant.create_publisher(QoS::default()).unwrap();
    let writer = publisher.create_writer(&topic).unwrap();
    assert_eq!(writer.matched_readers(), 1);

    writer
        .write(&Blip {
            value: 1,
            label: "late writer".to_string(),
        })
        .unwrap();
    assert!(reader.take_next_sample().unwrap().is_some());
}

#[test]
fn dispose_surfaces_tombstone() {
    let participant = Participant::builder("it_dispose").domain_id(13).build().unwrap();
    participant.register_type::<Blip>().unwrap();
    let (writer, reader) = entity_pair(&participant, "it/dispose/topic", QoS::default());

    let instance = Blip {
        value: 9,
        label: "gone".to_string(),
    };
    writer.dispose(&instance).unwrap();

    let sample = reader.take_next_sample().unwrap().expect("tombstone pending");
    assert_eq!(sample.info.instance_state, InstanceState::NotAliveDisposed);
    assert!(!sample.info.instance_state.is_alive());
    assert_eq!(sample.data, instance);
}

#[test]
fn incompatible_qos_does_not_bind() {
    let participant = Participant::builder("it_qos").domain_id(14).build().unwrap();
    participant.register_type::<Blip>().unwrap();
    let topic = participant.create_topic::<Blip>("it/qos/topic").unwrap();

    // Best-effort writer, reliable reader: no bind, no delivery
    let publisher = participant.create_publisher(QoS::best_effort()).unwrap();
    let writer = publisher.create_writer(&topic).unwrap();
    let subscriber = participant.create_subscriber(QoS::reliable()).unwrap();
    let reader = subscriber.create_reader(&topic).unwrap();

    assert_eq!(writer.matched_readers(), 0);
    writer
        .write(&Blip {
            value: 0,
            label: "dropped".to_string(),
        })
        .unwrap();
    assert!(reader.take_next_sample().unwrap().is_none());
}

#[test]
fn keep_last_displaces_oldest() {
    let participant = Participant::builder("it_hist").domain_id(15).build().unwrap();
    participant.register_type::<Blip>().unwrap();
    let qos = QoS::default().history(History::KeepLast(3));
    let (writer, reader) = entity_pair(&participant, "it/hist/topic", qos);

    for value in 1..=5 {
        writer
            .write(&Blip {
                value,
                label: String::new(),
            })
            .unwrap();
    }

    assert_eq!(reader.pending(), 3);
    let first = reader.take_next_sample().unwrap().unwrap();
    assert_eq!(first.data.value, 3, "oldest two were displaced");
}

#[test]
fn dropped_reader_detaches_from_writer() {
    let participant = Participant::builder("it_drop").domain_id(16).build().unwrap();
    participant.register_type::<Blip>().unwrap();
    let (writer, reader) = entity_pair(&participant, "it/drop/topic", QoS::default());

    assert_eq!(writer.matched_readers(), 1);
    drop(reader);
    assert_eq!(writer.matched_readers(), 0);
}
