// tests/operation_output.rs
//
// Exercises the OperationNode contract through a local compute-style variant,
// end to end with tensor indexing.

use tensor_ir::prelude::*;

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A two-output variant: element-wise quotient and remainder of two inputs.
#[derive(Debug)]
struct DivModOp {
    name: String,
    shape: Vec<Expr>,
    dtype: DType,
}

impl DivModOp {
    fn handle(shape: Vec<Expr>) -> Operation {
        Operation::new(DivModOp {
            name: "divmod".to_string(),
            shape,
            dtype: DType::I64,
        })
    }
}

impl OperationNode for DivModOp {
    fn name(&self) -> &str {
        &self.name
    }

    fn root_iter_vars(&self) -> Vec<IterVar> {
        self.shape
            .iter()
            .enumerate()
            .map(|(axis, extent)| IterVar::new(format!("ax{axis}"), extent.clone()))
            .collect()
    }

    fn num_outputs(&self) -> usize {
        2
    }

    fn output_name(&self, i: usize) -> Result<String, IrError> {
        self.check(i)?;
        Ok(format!("{}.{}", self.name, if i == 0 { "quot" } else { "rem" }))
    }

    fn output_dtype(&self, i: usize) -> Result<DType, IrError> {
        self.check(i)?;
        Ok(self.dtype)
    }

    fn output_shape(&self, i: usize) -> Result<Vec<Expr>, IrError> {
        self.check(i)?;
        Ok(self.shape.clone())
    }
}

impl DivModOp {
    fn check(&self, i: usize) -> Result<(), IrError> {
        if i < self.num_outputs() {
            Ok(())
        } else {
            Err(IrError::OutputIndex {
                op: self.name.clone(),
                index: i,
                num_outputs: self.num_outputs(),
            })
        }
    }
}

#[test]
fn test_outputs_in_range() {
    init();
    let op = DivModOp::handle(vec![Expr::var("n")]);
    let quot = op.output(0).unwrap();
    let rem = op.output(1).unwrap();

    assert_eq!(quot.op(), Some(&op));
    assert_eq!(rem.op(), Some(&op));
    assert_eq!(quot.value_index(), 0);
    assert_eq!(rem.value_index(), 1);
    assert_eq!(quot.name(), "divmod.quot");
    assert_eq!(rem.name(), "divmod.rem");
    assert_eq!(quot.dtype(), DType::I64);
    assert_eq!(quot.shape(), [Expr::var("n")]);
    assert_ne!(quot, rem);
}

#[test]
fn test_output_out_of_range() {
    init();
    let op = DivModOp::handle(vec![Expr::var("n")]);
    let err = op.output(2).unwrap_err();
    assert!(matches!(
        err,
        IrError::OutputIndex {
            index: 2,
            num_outputs: 2,
            ..
        }
    ));
}

#[test]
fn test_output_identity_stable_across_calls() {
    init();
    let op = DivModOp::handle(vec![Expr::var("n")]);
    let first = op.output(0).unwrap();
    let second = op.output(0).unwrap();
    assert_eq!(first, second);

    let mut memo = std::collections::HashMap::new();
    memo.insert(first, "lowered");
    assert_eq!(memo.get(&second), Some(&"lowered"));
}

#[test]
fn test_root_iter_vars_follow_shape() {
    init();
    let op = DivModOp::handle(vec![Expr::var("n"), Expr::var("m")]);
    let ivs = op.root_iter_vars();
    assert_eq!(
        ivs,
        vec![
            IterVar::new("ax0", Expr::var("n")),
            IterVar::new("ax1", Expr::var("m")),
        ]
    );
}

#[test]
fn test_reading_a_computed_tensor_keeps_provenance() {
    init();
    let op = DivModOp::handle(vec![Expr::var("n")]);
    let quot = op.output(0).unwrap();
    let read = quot.call(vec![Expr::var("i")]).unwrap();

    match read {
        Expr::Read { tensor, .. } => {
            assert_eq!(tensor.op(), Some(&op));
            assert_eq!(tensor.value_index(), 0);
        }
        other => panic!("expected Read, got {other:?}"),
    }
}

#[test]
fn test_end_to_end_scenario() {
    init();
    // Leaf tensor A of shape [2, 3].
    let a = Tensor::new(vec![2.into(), 3.into()], "A", DType::F32);
    assert_eq!(a.ndim(), 2);

    // A[0][1] collapses to the same expression as A(0, 1).
    let via_slice = a.at(0).at(1).to_expr().unwrap();
    let via_call = a.call(vec![0.into(), 1.into()]).unwrap();
    assert_eq!(via_slice, via_call);

    // Three coordinates against rank 2 is a rank mismatch.
    assert!(a.call(vec![0.into(), 1.into(), 2.into()]).is_err());

    // A two-output operation hands out distinct, well-indexed tensors.
    let op = DivModOp::handle(vec![2.into(), 3.into()]);
    assert_eq!(op.output(0).unwrap().value_index(), 0);
    assert_eq!(op.output(1).unwrap().value_index(), 1);
    assert_ne!(op.output(0).unwrap(), op.output(1).unwrap());
}
