//! Report rendering
//!
//! Writer-parameterized so tests capture output in a buffer. Two formats:
//! a plain root-to-leaf listing for single-shot mode, and the folded
//! (collapsed) stack format consumed by flame-graph tooling for sampling
//! mode.

use std::io::Write;

use crate::domain::{Stack, TraceError};
use crate::sampling::SampleSet;

/// Sentinel bucket name for samples that produced no stack.
const NULL_BUCKET: &str = "(null)";

/// Print one captured stack, outermost frame first, one per line.
///
/// # Errors
/// I/O failures writing the report.
pub fn write_stack(w: &mut impl Write, stack: &Stack) -> Result<(), TraceError> {
    for frame in stack.frames().iter().rev() {
        writeln!(w, "{frame}")?;
    }
    w.flush()?;
    Ok(())
}

/// Print the sampling aggregate in folded form: `root;...;leaf count`, one
/// distinct stack per line, highest count first (ties ordered lexically so
/// the report is stable run-to-run). A leading `(null) <count>` line
/// accounts for failed captures when there were any.
///
/// # Errors
/// A bucket holding an empty stack is a capture-logic defect and surfaces
/// as the fatal [`TraceError::CorruptSample`] rather than a malformed line.
pub fn write_folded(w: &mut impl Write, samples: &SampleSet) -> Result<(), TraceError> {
    if samples.null_samples() > 0 {
        writeln!(w, "{NULL_BUCKET} {}", samples.null_samples())?;
    }

    let mut lines = Vec::with_capacity(samples.len());
    for (stack, count) in samples.iter() {
        if stack.is_empty() {
            return Err(TraceError::CorruptSample);
        }
        let folded: Vec<String> =
            stack.frames().iter().rev().map(ToString::to_string).collect();
        lines.push((folded.join(";"), count));
    }
    lines.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    for (line, count) in lines {
        writeln!(w, "{line} {count}")?;
    }
    w.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Frame;

    fn stack_of(files: &[&str]) -> Stack {
        Stack::new(files.iter().copied().map(Frame::from_file).collect())
    }

    fn render_folded(samples: &SampleSet) -> String {
        let mut out = Vec::new();
        write_folded(&mut out, samples).expect("folded");
        String::from_utf8(out).expect("utf8")
    }

    #[test]
    fn test_single_shot_prints_root_first() {
        // Innermost-first capture order: util.py is executing.
        let stack = stack_of(&["util.py", "lib.py", "main.py"]);
        let mut out = Vec::new();
        write_stack(&mut out, &stack).expect("stack");
        assert_eq!(String::from_utf8(out).unwrap(), "main.py\nlib.py\nutil.py\n");
    }

    #[test]
    fn test_folded_lines_and_null_bucket() {
        let mut samples = SampleSet::new();
        let a = stack_of(&["a.py", "main.py"]);
        samples.record(a.clone());
        samples.record(a);
        samples.record(stack_of(&["b.py", "main.py"]));
        samples.record_null();

        let rendered = render_folded(&samples);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines, ["(null) 1", "main.py;a.py 2", "main.py;b.py 1"]);
    }

    #[test]
    fn test_no_null_line_when_all_captures_succeeded() {
        let mut samples = SampleSet::new();
        samples.record(stack_of(&["main.py"]));

        assert_eq!(render_folded(&samples), "main.py 1\n");
    }

    #[test]
    fn test_ties_are_ordered_lexically() {
        let mut samples = SampleSet::new();
        samples.record(stack_of(&["b.py"]));
        samples.record(stack_of(&["a.py"]));

        assert_eq!(render_folded(&samples), "a.py 1\nb.py 1\n");
    }

    #[test]
    fn test_empty_stack_bucket_is_fatal() {
        let mut samples = SampleSet::new();
        samples.record(Stack::new(Vec::new()));

        let mut out = Vec::new();
        let err = write_folded(&mut out, &samples).expect_err("defect");
        assert!(matches!(err, TraceError::CorruptSample));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_frames_render_full_identity() {
        let stack = Stack::new(vec![
            Frame { file: "util.py".into(), name: Some("helper".into()), line: Some(10) },
            Frame { file: "main.py".into(), name: Some("<module>".into()), line: Some(1) },
        ]);
        let mut samples = SampleSet::new();
        samples.record(stack);

        assert_eq!(render_folded(&samples), "main.py:<module>:1;util.py:helper:10 1\n");
    }
}
