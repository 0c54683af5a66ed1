//! End-to-end pipeline tests over scripted memory: walk a fake interpreter's
//! frame chain, aggregate samples, and render both report formats.

use pystack::domain::{Frame, RemoteAddress, Stack, TraceError};
use pystack::interpreter::{layout_for, PyVersion};
use pystack::report;
use pystack::sampling::{self, SampleSet, SampleSource, Sampler};
use pystack::test_utils::FakeMemory;

use std::time::Duration;

const TSTATE: u64 = 0x10_0000;

/// Build a three-frame python 3.8 interpreter snapshot in fake memory,
/// using the real 3.8 offsets.
fn python38_three_frames() -> FakeMemory {
    let layout = layout_for(PyVersion::new(3, 8)).expect("3.8 layout");
    let mut mem = FakeMemory::new();

    let frames =
        [(0x20_0000, "util.py", "helper", 10), (0x30_0000, "lib.py", "work", 20), (0x40_0000, "main.py", "<module>", 1)];

    mem.put_u64(TSTATE + layout.tstate_frame, frames[0].0);
    for (i, (addr, file, name, line)) in frames.iter().enumerate() {
        let back = frames.get(i + 1).map_or(0, |next| next.0);
        let code = addr + 0x1000;
        let file_str = addr + 0x2000;
        let name_str = addr + 0x3000;

        mem.put_u64(addr + layout.frame_back, back);
        mem.put_u64(addr + layout.frame_code, code);
        mem.put_u32(addr + layout.frame_lineno, *line);
        mem.put_u64(code + layout.code_filename, file_str);
        mem.put_u64(code + layout.code_name, name_str);
        for (str_addr, s) in [(file_str, file), (name_str, name)] {
            mem.put_u64(str_addr + layout.str_len, s.len() as u64);
            mem.put_bytes(str_addr + layout.str_data, s.as_bytes());
        }
    }
    mem
}

#[test]
fn test_single_shot_over_fake_interpreter() {
    let layout = layout_for(PyVersion::new(3, 8)).expect("3.8 layout");
    let mem = python38_three_frames();

    let stack = sampling::capture(&mem, &layout, RemoteAddress(TSTATE)).expect("capture");
    assert_eq!(stack.depth(), 3);

    let mut out = Vec::new();
    report::write_stack(&mut out, &stack).expect("render");
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "main.py:<module>:1\nlib.py:work:20\nutil.py:helper:10\n"
    );
}

#[test]
fn test_capture_survives_target_mutation() {
    let layout = layout_for(PyVersion::new(3, 8)).expect("3.8 layout");
    let mut mem = python38_three_frames();

    // First capture succeeds.
    assert!(sampling::capture(&mem, &layout, RemoteAddress(TSTATE)).is_ok());

    // The middle frame's record disappears, as if the target dropped it
    // between samples. The capture fails recoverably and a later capture of
    // restored memory works again.
    mem.forget(0x30_0000 + layout.frame_code, 8);
    let err = sampling::capture(&mem, &layout, RemoteAddress(TSTATE)).expect_err("truncated");
    assert!(err.is_recoverable());

    mem.put_u64(0x30_0000 + layout.frame_code, 0x30_0000 + 0x1000);
    assert!(sampling::capture(&mem, &layout, RemoteAddress(TSTATE)).is_ok());
}

/// Scripted source for driving the sampler without a live process.
struct Scripted {
    results: Vec<Result<Stack, TraceError>>,
    next: usize,
    exits_after: usize,
}

impl SampleSource for Scripted {
    fn capture(&mut self) -> Result<Stack, TraceError> {
        let result = self.results.get(self.next);
        self.next += 1;
        match result {
            Some(Ok(stack)) => Ok(stack.clone()),
            Some(Err(_)) | None => Err(TraceError::NoThreadState),
        }
    }

    fn release(&mut self) -> Result<(), TraceError> {
        if self.next >= self.exits_after {
            return Err(TraceError::TargetExited(pystack::domain::Pid(9)));
        }
        Ok(())
    }

    fn suspend(&mut self) -> Result<(), TraceError> {
        Ok(())
    }
}

#[test]
fn test_sampling_aggregate_renders_folded_report() {
    let a = Stack::new(vec![Frame::from_file("a.py"), Frame::from_file("main.py")]);
    let b = Stack::new(vec![Frame::from_file("b.py"), Frame::from_file("main.py")]);
    let mut source = Scripted {
        results: vec![
            Ok(a.clone()),
            Ok(a),
            Ok(b),
            Err(TraceError::EmptyStack),
        ],
        next: 0,
        exits_after: 4,
    };

    let sampler = Sampler::new(Duration::from_millis(1), Duration::from_secs(60));
    let samples = sampler.run(&mut source).expect("sampling");

    let mut out = Vec::new();
    report::write_folded(&mut out, &samples).expect("render");
    let rendered = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = rendered.lines().collect();
    assert_eq!(lines, ["(null) 1", "main.py;a.py 2", "main.py;b.py 1"]);
}

#[test]
fn test_empty_aggregate_renders_nothing() {
    let samples = SampleSet::new();
    let mut out = Vec::new();
    report::write_folded(&mut out, &samples).expect("render");
    assert!(out.is_empty());
}
