//! Wire-format checks for every send operation through a recording sink.

mod fixtures;

use fixtures::RecordingSink;
use midi_tools::{
    send_bank_select, send_control_change, send_note_off, send_note_on, send_pitch_bend,
    send_program_change, Error,
};

#[test]
fn note_messages_over_full_domain() {
    for channel in 0..16u8 {
        for note in 0..=127u8 {
            for velocity in [0u8, 1, 64, 100, 127] {
                let out = RecordingSink::default();
                send_note_on(&out, channel, note, velocity, None).unwrap();
                send_note_off(&out, channel, note, velocity, None).unwrap();
                assert_eq!(
                    out.payloads(),
                    vec![
                        vec![0x90 | channel, note, velocity],
                        vec![0x80 | channel, note, velocity],
                    ]
                );
            }
        }
    }
}

#[test]
fn out_of_range_never_reaches_sink() {
    let out = RecordingSink::default();
    for bad in [16u8, 100, 255] {
        assert!(matches!(
            send_note_on(&out, bad, 60, 100, None),
            Err(Error::InvalidChannel(c)) if c == bad
        ));
        assert!(send_pitch_bend(&out, bad, 0, None).is_err());
        assert!(send_bank_select(&out, bad, 0, None).is_err());
    }
    for bad in [128u8, 200, 255] {
        assert!(send_note_on(&out, 0, bad, 100, None).is_err());
        assert!(send_note_on(&out, 0, 60, bad, None).is_err());
        assert!(send_note_off(&out, 0, bad, 0, None).is_err());
        assert!(send_program_change(&out, 0, bad, None).is_err());
        assert!(matches!(
            send_control_change(&out, 0, bad, 64, None),
            Err(Error::InvalidValue { name: "controller", .. })
        ));
        assert!(matches!(
            send_control_change(&out, 0, 1, bad, None),
            Err(Error::InvalidValue { name: "value", .. })
        ));
    }
    assert!(send_pitch_bend(&out, 0, 8192, None).is_err());
    assert!(send_pitch_bend(&out, 0, i16::MIN, None).is_err());
    assert!(send_bank_select(&out, 0, 16384, Some(10.0)).is_err());
    assert!(out.calls().is_empty());
}

#[test]
fn error_messages_name_parameter_and_range() {
    let out = RecordingSink::default();
    let err = send_note_on(&out, 16, 60, 100, None).unwrap_err();
    assert_eq!(err.to_string(), "Invalid MIDI channel: 16. Must be 0-15");
    let err = send_note_on(&out, 0, 60, 128, None).unwrap_err();
    assert_eq!(err.to_string(), "Invalid velocity: 128. Must be 0-127");
    let err = send_program_change(&out, 0, 128, None).unwrap_err();
    assert_eq!(err.to_string(), "Invalid program: 128. Must be 0-127");
    let err = send_pitch_bend(&out, 0, -8193, None).unwrap_err();
    assert_eq!(err.to_string(), "Invalid pitch bend value: -8193. Must be -8192 to 8191");
    let err = send_bank_select(&out, 0, 16384, None).unwrap_err();
    assert_eq!(err.to_string(), "Invalid MIDI bank: 16384. Must be 0-16383");
}

#[test]
fn control_change_extremes() {
    let out = RecordingSink::default();
    send_control_change(&out, 5, 0, 0, None).unwrap();
    send_control_change(&out, 5, 127, 127, Some(12.5)).unwrap();
    assert_eq!(
        out.calls(),
        vec![
            (vec![0xB5, 0, 0], None),
            (vec![0xB5, 127, 127], Some(12.5)),
        ]
    );
}

#[test]
fn pitch_bend_decodes_back_to_input() {
    let out = RecordingSink::default();
    for value in -8192i16..=8191 {
        send_pitch_bend(&out, 10, value, None).unwrap();
    }
    let payloads = out.payloads();
    assert_eq!(payloads.len(), 16384);
    for (payload, expected) in payloads.iter().zip(-8192i32..) {
        assert_eq!(payload[0], 0xEA);
        let decoded = (((payload[2] as i32) << 7) | payload[1] as i32) - 8192;
        assert_eq!(decoded, expected);
    }
}

#[test]
fn program_change_is_two_bytes() {
    let out = RecordingSink::default();
    send_program_change(&out, 0, 0, None).unwrap();
    send_program_change(&out, 15, 127, None).unwrap();
    assert_eq!(out.payloads(), vec![vec![0xC0, 0], vec![0xCF, 127]]);
}

#[test]
fn bank_select_pairs_over_full_domain() {
    for bank in 0..=16383u16 {
        let out = RecordingSink::default();
        send_bank_select(&out, 3, bank, Some(1000.0)).unwrap();
        let calls = out.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], (vec![0xB3, 0, (bank >> 7) as u8], Some(1000.0)));
        assert_eq!(calls[1], (vec![0xB3, 32, (bank & 0x7F) as u8], Some(1001.0)));
    }
}
