//! Decoder state and packet query tests, following libopus `test_opus_api.c`.

use giztoy_opus::api::{DecoderState, SAMPLE_RATES};
use giztoy_opus::{ffi, packet, Ctl, Error};

fn decoder() -> DecoderState {
    DecoderState::new(48000, 2).unwrap()
}

#[test]
fn get_size() {
    for channels in 0..4 {
        let size = DecoderState::get_size(channels);
        if channels == 1 || channels == 2 {
            assert!(size > 0 && size <= 1 << 16, "channels={} size={}", channels, size);
        } else {
            assert_eq!(size, 0);
        }
    }
}

#[test]
fn unsupported_sample_rates() {
    for channels in 0..4 {
        for fs in [-8000, 0, 1, 7999, 8001, 11025, 22050, 32000, 44100, 96000, i32::MAX, i32::MIN] {
            let err = DecoderState::new(fs, channels).unwrap_err();
            assert_eq!(err.code(), ffi::OPUS_BAD_ARG, "fs={} channels={}", fs, channels);
        }
    }
    for fs in SAMPLE_RATES {
        for channels in [0, 3] {
            assert!(matches!(DecoderState::new(fs, channels), Err(Error::BadArg(_))));
        }
    }
}

#[test]
fn create() {
    for fs in SAMPLE_RATES {
        for channels in 1..=2 {
            let mut dec = DecoderState::new(fs, channels).unwrap();
            dec.destroy();
            assert!(dec.is_closed());
        }
    }
}

#[test]
fn get_final_range() {
    let mut dec = decoder();
    assert!(dec.ctl(Ctl::GetFinalRange).unwrap().as_u32().is_some());
}

#[test]
fn unimplemented() {
    let err = Ctl::from_request(ffi::OPUS_UNIMPLEMENTED, None).unwrap_err();
    assert_eq!(err.code(), ffi::OPUS_UNIMPLEMENTED);

    let mut dec = decoder();
    for ctl in [Ctl::GetBitrate, Ctl::SetComplexity(5), Ctl::GetLookahead] {
        assert!(matches!(dec.ctl(ctl), Err(Error::Unimplemented(_))), "{}", ctl);
    }
}

#[test]
fn get_bandwidth() {
    let mut dec = decoder();
    assert_eq!(dec.ctl(Ctl::GetBandwidth).unwrap().as_i32(), Some(0));
}

#[test]
fn get_pitch() {
    let mut dec = decoder();
    let pitch = |dec: &mut DecoderState| dec.ctl(Ctl::GetPitch).unwrap().as_i32().unwrap();

    assert!([-1, 0].contains(&pitch(&mut dec)));

    dec.decode(&[252, 0, 0], 960, false).unwrap();
    assert!([-1, 0].contains(&pitch(&mut dec)));

    dec.decode(&[1, 0, 0], 960, false).unwrap();
    assert!([-1, 0].contains(&pitch(&mut dec)));
}

#[test]
fn gain() {
    let mut dec = decoder();
    assert_eq!(dec.ctl(Ctl::GetGain).unwrap().as_i32(), Some(0));

    for bad in [-32769, 32768] {
        let err = dec.ctl(Ctl::SetGain(bad)).unwrap_err();
        assert_eq!(err.code(), ffi::OPUS_BAD_ARG);
    }

    dec.ctl(Ctl::SetGain(-15)).unwrap();
    assert_eq!(dec.ctl(Ctl::GetGain).unwrap().as_i32(), Some(-15));
}

#[test]
fn reset_state() {
    let mut dec = decoder();
    dec.decode(&[252, 0, 0], 960, false).unwrap();
    dec.ctl(Ctl::ResetState).unwrap();
}

#[test]
fn get_nb_samples() {
    let dec = decoder();
    assert_eq!(dec.nb_samples(&[0]).unwrap(), 480);

    let packet = [(63 << 2) | 3, 63];
    assert!(matches!(dec.nb_samples(&packet), Err(Error::InvalidPacket(_))));
}

#[test]
fn packet_get_nb_frames() {
    assert!(matches!(packet::nb_frames(&[]), Err(Error::BadArg(_))));

    let l1res = [Ok(1), Ok(2), Ok(2), Err(ffi::OPUS_INVALID_PACKET)];

    for toc in 0..=255u8 {
        let expected = l1res[(toc & 3) as usize];
        assert_eq!(packet::nb_frames(&[toc]).map_err(|e| e.code()), expected);

        for count in 0..=255u8 {
            let want = match expected {
                Ok(n) => n,
                Err(_) => (count & 63) as usize,
            };
            assert_eq!(packet::nb_frames(&[toc, count]).unwrap(), want);
        }
    }
}

#[test]
fn packet_get_bandwidth() {
    for toc in 0..=255u8 {
        let bw = (toc >> 4) as i32;
        let hybrid = i32::from(bw & 8 != 0);
        let expected = ffi::OPUS_BANDWIDTH_NARROWBAND
            + (((((bw & 7) * 9) & (63 - (bw & 8))) + 2 + 12 * hybrid) >> 4);
        assert_eq!(packet::bandwidth(&[toc]).unwrap().code(), expected, "toc={}", toc);
    }
}

#[test]
fn decode() {
    let mut dec = decoder();

    let mut packet = vec![255, 49];
    packet.resize(51, 0);
    let err = dec.decode(&packet, 960, false).unwrap_err();
    assert_eq!(err.code(), ffi::OPUS_INVALID_PACKET);

    let packet = [252, 0, 0];
    for frame_size in [60, 480] {
        let err = dec.decode(&packet, frame_size, false).unwrap_err();
        assert_eq!(err.code(), ffi::OPUS_BUFFER_TOO_SMALL, "frame_size={}", frame_size);
    }

    let pcm = dec.decode(&packet, 960, false).unwrap();
    assert_eq!(pcm.len(), 960 * 2);
}

#[test]
fn decode_float() {
    let mut dec = decoder();
    let pcm = dec.decode_float(&[252, 0, 0], 960, false).unwrap();
    assert_eq!(pcm.len(), 960 * 2);
}

#[test]
fn destroyed_state() {
    let mut dec = decoder();
    dec.destroy();
    dec.destroy();
    assert!(matches!(dec.ctl(Ctl::ResetState), Err(Error::InvalidState(_))));
    assert!(matches!(dec.decode_float(&[252, 0, 0], 960, false), Err(Error::InvalidState(_))));
}
