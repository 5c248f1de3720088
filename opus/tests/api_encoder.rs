//! Encoder state tests, following libopus `test_opus_api.c`.

use giztoy_opus::api::{EncoderState, SAMPLE_RATES};
use giztoy_opus::{ffi, pcm, Ctl, Error};

fn encoder() -> EncoderState {
    EncoderState::new(48000, 2, ffi::OPUS_APPLICATION_AUDIO).unwrap()
}

/// Bad values must be rejected with `BadArg`; good values must read back
/// unchanged.
fn check_setget(set: fn(i32) -> Ctl, get: Ctl, bad: &[i32], good: &[i32]) {
    let mut enc = encoder();

    for &value in bad {
        let err = enc.ctl(set(value)).unwrap_err();
        assert_eq!(err.code(), ffi::OPUS_BAD_ARG, "{} accepted", set(value));
    }

    for &value in good {
        enc.ctl(set(value)).unwrap();
        assert_eq!(enc.ctl(get).unwrap().as_i32(), Some(value), "{}", set(value));
    }
}

#[test]
fn get_size() {
    for channels in 0..4 {
        let size = EncoderState::get_size(channels);
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
            let err = EncoderState::new(fs, channels, ffi::OPUS_APPLICATION_VOIP).unwrap_err();
            assert_eq!(err.code(), ffi::OPUS_BAD_ARG, "fs={} channels={}", fs, channels);
        }
    }
}

#[test]
fn create() {
    let err = EncoderState::new(48000, 2, ffi::OPUS_AUTO).unwrap_err();
    assert_eq!(err.code(), ffi::OPUS_BAD_ARG);

    for application in [
        ffi::OPUS_APPLICATION_VOIP,
        ffi::OPUS_APPLICATION_RESTRICTED_LOWDELAY,
        ffi::OPUS_APPLICATION_AUDIO,
    ] {
        let mut enc = EncoderState::new(48000, 2, application).unwrap();
        let lookahead = enc.ctl(Ctl::GetLookahead).unwrap().as_i32().unwrap();
        assert!((0..=32766).contains(&lookahead));
        enc.destroy();
    }

    for fs in SAMPLE_RATES {
        for channels in 1..=2 {
            EncoderState::new(fs, channels, ffi::OPUS_APPLICATION_VOIP).unwrap();
        }
    }
}

#[test]
fn encode() {
    let mut enc = encoder();
    let data = vec![0u8; pcm::pcm_len(960, 2, pcm::SampleFormat::I16)];
    let samples = pcm::bytes_to_i16(&data).unwrap();
    let packet = enc.encode(&samples, 960, data.len()).unwrap();
    assert!(!packet.is_empty());
}

#[test]
fn encode_float() {
    let mut enc = encoder();
    let data = vec![0u8; pcm::pcm_len(960, 2, pcm::SampleFormat::F32)];
    let samples = pcm::bytes_to_f32(&data).unwrap();
    let packet = enc.encode_float(&samples, 960, data.len()).unwrap();
    assert!(!packet.is_empty());
}

#[test]
fn encode_short_output() {
    let mut enc = encoder();
    let samples = vec![0i16; 960 * 2];
    let mut out = [0u8; 0];
    assert!(enc.encode_to(&samples, 960, &mut out).is_err());
}

#[test]
fn unimplemented() {
    let err = Ctl::from_request(ffi::OPUS_UNIMPLEMENTED, None).unwrap_err();
    assert_eq!(err.code(), ffi::OPUS_UNIMPLEMENTED);

    let mut enc = encoder();
    for ctl in [Ctl::GetGain, Ctl::SetGain(0), Ctl::GetPitch, Ctl::GetLastPacketDuration] {
        assert!(matches!(enc.ctl(ctl), Err(Error::Unimplemented(_))), "{}", ctl);
    }
}

#[test]
fn application() {
    check_setget(
        Ctl::SetApplication,
        Ctl::GetApplication,
        &[-1, ffi::OPUS_AUTO],
        &[ffi::OPUS_APPLICATION_AUDIO, ffi::OPUS_APPLICATION_RESTRICTED_LOWDELAY],
    );
}

#[test]
fn bitrate() {
    let mut enc = encoder();
    enc.ctl(Ctl::SetBitrate(1073741832)).unwrap();
    let value = enc.ctl(Ctl::GetBitrate).unwrap().as_i32().unwrap();
    assert!(value > 256000 && value < 700000, "bitrate={}", value);

    check_setget(Ctl::SetBitrate, Ctl::GetBitrate, &[-12345, 0], &[500, 256000]);
}

#[test]
fn force_channels() {
    check_setget(
        Ctl::SetForceChannels,
        Ctl::GetForceChannels,
        &[-1, 3],
        &[1, ffi::OPUS_AUTO],
    );
}

fn check_bandwidth_setter(set: fn(i32) -> Ctl, get: Ctl) {
    let mut enc = encoder();

    for bad in [-2, ffi::OPUS_BANDWIDTH_FULLBAND + 1] {
        let err = enc.ctl(set(bad)).unwrap_err();
        assert_eq!(err.code(), ffi::OPUS_BAD_ARG);
    }

    for good in [
        ffi::OPUS_BANDWIDTH_NARROWBAND,
        ffi::OPUS_BANDWIDTH_FULLBAND,
        ffi::OPUS_BANDWIDTH_WIDEBAND,
        ffi::OPUS_BANDWIDTH_MEDIUMBAND,
    ] {
        enc.ctl(set(good)).unwrap();
    }

    let value = enc.ctl(get).unwrap().as_i32().unwrap();
    assert!(
        [
            ffi::OPUS_BANDWIDTH_FULLBAND,
            ffi::OPUS_BANDWIDTH_MEDIUMBAND,
            ffi::OPUS_BANDWIDTH_WIDEBAND,
            ffi::OPUS_BANDWIDTH_NARROWBAND,
            ffi::OPUS_AUTO,
        ]
        .contains(&value),
        "bandwidth={}",
        value
    );
}

#[test]
fn bandwidth() {
    check_bandwidth_setter(Ctl::SetBandwidth, Ctl::GetBandwidth);

    let mut enc = encoder();
    enc.ctl(Ctl::SetBandwidth(ffi::OPUS_AUTO)).unwrap();
}

#[test]
fn max_bandwidth() {
    check_bandwidth_setter(Ctl::SetMaxBandwidth, Ctl::GetMaxBandwidth);
}

#[test]
fn dtx() {
    check_setget(Ctl::SetDtx, Ctl::GetDtx, &[-1, 2], &[1, 0]);
}

#[test]
fn complexity() {
    check_setget(Ctl::SetComplexity, Ctl::GetComplexity, &[-1, 11], &[0, 10]);
}

#[test]
fn inband_fec() {
    check_setget(Ctl::SetInbandFec, Ctl::GetInbandFec, &[-1, 3], &[1, 0]);
}

#[test]
fn packet_loss_perc() {
    check_setget(
        Ctl::SetPacketLossPerc,
        Ctl::GetPacketLossPerc,
        &[-1, 101],
        &[100, 0],
    );
}

#[test]
fn vbr() {
    check_setget(Ctl::SetVbr, Ctl::GetVbr, &[-1, 2], &[1, 0]);
}

#[test]
fn vbr_constraint() {
    check_setget(Ctl::SetVbrConstraint, Ctl::GetVbrConstraint, &[-1, 2], &[1, 0]);
}

#[test]
fn signal() {
    check_setget(
        Ctl::SetSignal,
        Ctl::GetSignal,
        &[-12345, 0x7FFFFFFF],
        &[ffi::OPUS_SIGNAL_MUSIC, ffi::OPUS_AUTO],
    );
}

#[test]
fn lsb_depth() {
    check_setget(Ctl::SetLsbDepth, Ctl::GetLsbDepth, &[7, 25], &[16, 24]);
}

#[test]
fn gets_are_idempotent() {
    let mut enc = encoder();
    for get in [Ctl::GetBitrate, Ctl::GetComplexity, Ctl::GetSignal, Ctl::GetLookahead] {
        let first = enc.ctl(get).unwrap();
        assert_eq!(enc.ctl(get).unwrap(), first, "{}", get);
    }
}

#[test]
fn destroyed_state() {
    let mut enc = encoder();
    enc.destroy();
    assert!(matches!(enc.ctl(Ctl::GetBitrate), Err(Error::InvalidState(_))));
    assert!(matches!(
        enc.encode_float(&[0.0; 1920], 960, 4000),
        Err(Error::InvalidState(_))
    ));
}
