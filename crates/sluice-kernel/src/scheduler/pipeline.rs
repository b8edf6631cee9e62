//! Pipeline execution for sluice.
//!
//! Launches every stage of a pipeline with its ports wired to its
//! neighbours, then waits for all of them:
//!
//! ```text
//!   ambient in ──▶ stage 0 ──junction 0──▶ stage 1 ──junction 1──▶ stage 2 ──▶ ambient out
//! ```
//!
//! Each junction is unused, an OS pipe, or a value channel, as the checker
//! decided. All stages are launched before any is awaited, so a stage that
//! blocks on its neighbour cannot deadlock against the launch loop.

use std::sync::Arc;

use sluice_types::{Bounds, PipelineAnnotation, Span};

use crate::error::{defect, Defect, EvalError, EvalResult};
use crate::interpreter::{values_op, Evaluator, StageOp, ValuesOp};
use crate::value::Value;

use super::port::Junction;

/// Compile a pipeline of stage operations.
///
/// The result has one value per stage: that stage's final status message.
pub fn pipeline(span: Span, stages: Vec<StageOp>, annotation: PipelineAnnotation) -> ValuesOp {
    let stages: Arc<[StageOp]> = stages.into();
    let annotation = Arc::new(annotation);
    values_op(move |ev| {
        let stages = stages.clone();
        let annotation = annotation.clone();
        async move { run_pipeline(span, &stages, &annotation, ev).await }
    })
}

/// Run `stages` on copies of `ev`, wired per `annotation`.
#[tracing::instrument(level = "debug", skip_all, fields(stages = stages.len(), %span))]
pub async fn run_pipeline(
    span: Span,
    stages: &[StageOp],
    annotation: &PipelineAnnotation,
    ev: Evaluator,
) -> EvalResult<Vec<Value>> {
    check_bounds(span, &ev, annotation.bounds)?;

    let mut handles = Vec::with_capacity(stages.len());
    let mut next_input = None;
    for (i, op) in stages.iter().enumerate() {
        let mut stage_ev = ev.clone();
        if let Some(port) = next_input.take() {
            stage_ev.input = port;
        }
        if i + 1 < stages.len() {
            let kind = *annotation.internals.get(i).ok_or_else(|| {
                defect(Defect::MissingJunction { index: i, stages: stages.len() })
            })?;
            let junction = Junction::new(kind)
                .map_err(|e| EvalError::user(span, format!("failed to create pipe: {e}")))?;
            tracing::debug!(junction = i, %kind, "wired junction");
            stage_ev.output = junction.output;
            next_input = Some(junction.input);
        }
        handles.push(op(stage_ev).await?);
    }
    drop(ev);

    let mut exits = Vec::with_capacity(handles.len());
    for (i, handle) in handles.into_iter().enumerate() {
        let update = handle.finish().await.unwrap_or_default();
        tracing::debug!(stage = i, status = %update, "stage finished");
        exits.push(Value::String(update.msg));
    }
    Ok(exits)
}

fn check_bounds(span: Span, ev: &Evaluator, bounds: Bounds) -> EvalResult<()> {
    if !bounds.input.admits(ev.input.kind()) {
        return Err(EvalError::user(span, "pipeline input not satisfiable"));
    }
    if !bounds.output.admits(ev.output.kind()) {
        return Err(EvalError::user(span, "pipeline output not satisfiable"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::stage_op;
    use crate::scheduler::{stage_channel, Port, StageHandle};
    use crate::testing::evaluator;
    use sluice_types::{StateUpdate, StreamKind, StreamShape};
    use std::sync::atomic::{AtomicBool, Ordering};

    /// A stage that finishes at once with `msg`.
    fn exits(msg: &'static str) -> StageOp {
        stage_op(move |_ev| async move { Ok(StageHandle::finished(StateUpdate::new(msg))) })
    }

    /// A stage that records the kinds of the ports it was given.
    fn record_ports(seen: Arc<std::sync::Mutex<Vec<(StreamKind, StreamKind)>>>) -> StageOp {
        stage_op(move |ev: Evaluator| {
            let seen = seen.clone();
            async move {
                seen.lock().unwrap().push((ev.input.kind(), ev.output.kind()));
                Ok(StageHandle::finished(StateUpdate::ok()))
            }
        })
    }

    #[tokio::test]
    async fn one_exit_value_per_stage() {
        let op = pipeline(
            Span::default(),
            vec![exits("a"), exits("b"), exits("c")],
            PipelineAnnotation::new(Bounds::default(), vec![StreamKind::Unused; 2]),
        );
        let out = op(evaluator()).await.unwrap();
        assert_eq!(out, vec![Value::from("a"), Value::from("b"), Value::from("c")]);
    }

    #[tokio::test]
    async fn junctions_follow_annotation() {
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let op = pipeline(
            Span::default(),
            vec![
                record_ports(seen.clone()),
                record_ports(seen.clone()),
                record_ports(seen.clone()),
            ],
            PipelineAnnotation::new(Bounds::default(), vec![StreamKind::Chan, StreamKind::Fd]),
        );
        op(evaluator()).await.unwrap();
        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![
                (StreamKind::Unused, StreamKind::Chan),
                (StreamKind::Chan, StreamKind::Fd),
                (StreamKind::Fd, StreamKind::Unused),
            ]
        );
    }

    #[tokio::test]
    async fn incompatible_input_fails_before_launch() {
        let launched = Arc::new(AtomicBool::new(false));
        let flag = launched.clone();
        let stage = stage_op(move |_ev| {
            let flag = flag.clone();
            async move {
                flag.store(true, Ordering::SeqCst);
                Ok(StageHandle::finished(StateUpdate::ok()))
            }
        });
        let op = pipeline(
            Span::new(1, 1),
            vec![stage],
            PipelineAnnotation::new(Bounds::new(StreamShape::Chan, StreamShape::Unused), vec![]),
        );
        let err = op(evaluator()).await.unwrap_err();
        assert_eq!(err.to_string(), "1:1: pipeline input not satisfiable");
        assert!(!launched.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn incompatible_output_is_reported() {
        let ev = evaluator().with_ports(Port::Unused, Port::Unused);
        let op = pipeline(
            Span::new(2, 3),
            vec![exits("")],
            PipelineAnnotation::new(Bounds::new(StreamShape::Unused, StreamShape::Either), vec![]),
        );
        let err = op(ev).await.unwrap_err();
        assert_eq!(err.to_string(), "2:3: pipeline output not satisfiable");
    }

    #[tokio::test]
    async fn missing_junction_is_a_defect() {
        let op = pipeline(
            Span::default(),
            vec![exits(""), exits("")],
            PipelineAnnotation::new(Bounds::default(), vec![]),
        );
        assert!(op(evaluator()).await.unwrap_err().is_defect());
    }

    #[tokio::test]
    async fn silent_stage_exits_with_empty_message() {
        let silent = stage_op(|_ev| async {
            let (status, handle) = stage_channel();
            drop(status);
            Ok(handle)
        });
        let op = pipeline(Span::default(), vec![silent], PipelineAnnotation::default());
        assert_eq!(op(evaluator()).await.unwrap(), vec![Value::from("")]);
    }

    #[tokio::test]
    async fn empty_pipeline_yields_nothing() {
        let op = pipeline(Span::default(), vec![], PipelineAnnotation::default());
        assert!(op(evaluator()).await.unwrap().is_empty());
    }
}
