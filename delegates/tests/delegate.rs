mod common;
use ankurah_delegates::*;
use anyhow::Result;

struct Gauge {
    readings: Vec<f64>,
}

impl Gauge {
    fn push(&mut self, reading: f64) -> usize {
        self.readings.push(reading);
        self.readings.len()
    }

    fn offset(&self, offset: f64, index: usize) -> Option<f64> { self.readings.get(index).map(|reading| reading + offset) }
}

#[test]
fn test_delegate_over_a_bound_method() -> Result<()> {
    let mut gauge = Gauge { readings: Vec::new() };
    {
        let mut delegate: Delegate<(f64,), usize> = Delegate::new();
        delegate.bind(BoundMethod::new(&mut gauge, Gauge::push), Priority::new(1))?;
        assert_eq!(delegate.invoke((1.5,))?, 1);
        assert_eq!(delegate.invoke((2.5,))?, 2);

        assert!(delegate.unbind().is_some());
        assert_eq!(delegate.invoke((3.5,)), Err(DelegateError::NotBound));
    }
    assert_eq!(gauge.readings, [1.5, 2.5]);

    let mut offsets: Delegate<(usize,), Option<f64>> = Delegate::new();
    offsets.bind_curried(BoundMethod::new(&gauge, Gauge::offset), Priority::UNSET, (10.0,))?;
    assert_eq!(offsets.invoke((1,))?, Some(12.5));
    assert_eq!(offsets.invoke((9,))?, None);
    Ok(())
}

#[test]
fn test_prebuilt_wrapper_moves_between_delegates() -> Result<()> {
    let mut first: Delegate<(i32, i32), i32> = Delegate::new();
    first.bind_wrapper(CallableWrapper::new(FreeFunction(|a: i32, b: i32| a * b)), Priority::new(3))?;

    let mut second = Delegate::new();
    if let Some(wrapper) = first.unbind() {
        second.bind_wrapper(wrapper, Priority::new(4))?;
    }
    assert!(!first.is_bound());
    assert_eq!(second.invoke((6, 7))?, 42);
    Ok(())
}

#[test]
fn test_delegates_sort_by_priority() {
    let mut delegates: Vec<Delegate<(), &'static str>> = Vec::new();
    for (name, priority) in [("unset", Priority::UNSET), ("late", Priority::new(9)), ("early", Priority::new(0))] {
        let mut delegate = Delegate::new();
        delegate.bind(FreeFunction(move || name), priority).unwrap();
        delegates.push(delegate);
    }
    delegates.sort();

    let names: Vec<_> = delegates.iter_mut().map(|delegate| delegate.invoke(()).unwrap()).collect();
    assert_eq!(names, ["early", "late", "unset"]);
    // equality is by priority alone
    assert_ne!(delegates[0], delegates[1]);
    assert_eq!(Delegate::<(), &str>::new(), Delegate::new());
}
