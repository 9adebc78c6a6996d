//! Mirrors `original_source/examples/example_fibonacci.py`, using the
//! parameterized `fib_next : Pi z,y=z-1,x=z-2. fib(x) -> fib(y) -> fib(z)`
//! shape named directly in the spec's seed scenarios: a single recursive
//! combinator whose own literal parameters are grounded by necessary
//! substitution against the requested index, with the dependent
//! relationships (`y=z-1`, `x=z-2`) enforced as a deferred term predicate
//! rather than one combinator instance per index.

use std::rc::Rc;

use cosy::literal::LiteralValue;
use cosy::spec::{GroupValues, ParameterSpace, Predicate};
use cosy::synthesizer::CombinatorInfo;
use cosy::taxonomy::Taxonomy;
use cosy::types::Type;
use cosy::Cosy;

fn fib_type(n: i64) -> Type {
    Type::constructor("fib", Type::literal(n, "int"))
}

fn int_range(up_to: i64) -> GroupValues {
    GroupValues::Enumerable((0..=up_to).map(LiteralValue::Int).collect())
}

fn fib_recurrence() -> Predicate {
    Predicate::new("fib_recurrence", &["z", "y", "x"], |bindings| {
        match (bindings.get("z"), bindings.get("y"), bindings.get("x")) {
            (Some(&LiteralValue::Int(z)), Some(&LiteralValue::Int(y)), Some(&LiteralValue::Int(x))) => {
                y == z - 1 && x == z - 2
            }
            _ => false,
        }
    })
}

fn fib_next() -> CombinatorInfo {
    let groups = [("z", "int"), ("y", "int"), ("x", "int")].into_iter().collect();
    let type_ = Type::arrow(
        Type::constructor("fib", Type::var("x")),
        Type::arrow(Type::constructor("fib", Type::var("y")), Type::constructor("fib", Type::var("z"))),
    );
    CombinatorInfo::new("fib_next", vec!["z", "y", "x"], groups, vec![fib_recurrence()], type_)
}

fn fibonacci_combinators(up_to: i64) -> (Vec<CombinatorInfo>, ParameterSpace) {
    let mut parameters = ParameterSpace::new();
    parameters.declare("int", int_range(up_to));
    let combinators =
        vec![CombinatorInfo::simple("fib_zero", fib_type(0)), CombinatorInfo::simple("fib_one", fib_type(1)), fib_next()];
    (combinators, parameters)
}

fn reference_fib(n: i64) -> i64 {
    let (mut a, mut b) = (0i64, 1i64);
    for _ in 0..n {
        let next = a + b;
        a = b;
        b = next;
    }
    a
}

#[test]
fn synthesizes_the_unique_tree_for_fib_five() {
    let mut taxonomy = Taxonomy::new();
    taxonomy.close();
    let (combinators, parameters) = fibonacci_combinators(5);
    let cosy = Cosy::new(taxonomy, combinators, parameters);

    let trees = cosy.solve(&cosy::Specification::Type(fib_type(5)), 5).unwrap();
    assert_eq!(trees.len(), 1, "fib(5) has exactly one derivation given the single recurrence combinator");

    let mut components: std::collections::HashMap<_, Rc<dyn Fn(&[i64]) -> i64>, ahash::RandomState> =
        Default::default();
    components.insert("fib_zero", Rc::new(|_: &[i64]| 0));
    components.insert("fib_one", Rc::new(|_: &[i64]| 1));
    components.insert("fib_next", Rc::new(|args: &[i64]| args[0] + args[1]));

    let value = cosy.interpret(&trees[0], &components, |_: LiteralValue| unreachable!("no literal leaves"));
    assert_eq!(value, reference_fib(5));
}

#[test]
fn no_derivation_exists_past_the_declared_index_range() {
    let mut taxonomy = Taxonomy::new();
    taxonomy.close();
    let (combinators, parameters) = fibonacci_combinators(3);
    let cosy = Cosy::new(taxonomy, combinators, parameters);

    let trees = cosy.solve(&cosy::Specification::Type(fib_type(5)), 5).unwrap();
    assert!(trees.is_empty(), "the `int` group only covers 0..=3, so z=5 can never be grounded");
}
