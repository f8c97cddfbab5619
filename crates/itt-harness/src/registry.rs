//! Test cases, the registry that owns them, and the registration phase
//!
//! Suites register into an explicitly passed [`TestRegistry`] through a
//! [`TestRegistrar`]; there is no process-global list. Registration order is
//! execution order, and duplicate `suite.name` pairs are kept and run twice.

use std::fmt;

/// A zero-argument callable slot (body, setup or teardown)
pub type TestFn = Box<dyn Fn()>;

/// Per-test setup/teardown pair
pub trait Fixture: 'static {
    fn set_up();
    fn tear_down();
}

/// A registered test
pub struct TestCase {
    pub suite: String,
    pub name: String,
    pub body: Option<TestFn>,
    pub setup: Option<TestFn>,
    pub teardown: Option<TestFn>,
    pub skip: bool,
    pub skip_reason: String,
}

impl TestCase {
    /// Create a test case with a body and no fixture
    pub fn new(
        suite: impl Into<String>,
        name: impl Into<String>,
        body: impl Fn() + 'static,
    ) -> Self {
        Self {
            suite: suite.into(),
            name: name.into(),
            body: Some(Box::new(body)),
            setup: None,
            teardown: None,
            skip: false,
            skip_reason: String::new(),
        }
    }

    pub fn with_setup(mut self, setup: impl Fn() + 'static) -> Self {
        self.setup = Some(Box::new(setup));
        self
    }

    pub fn with_teardown(mut self, teardown: impl Fn() + 'static) -> Self {
        self.teardown = Some(Box::new(teardown));
        self
    }

    /// Use `F::set_up` / `F::tear_down` around the body
    pub fn with_fixture<F: Fixture>(self) -> Self {
        self.with_setup(F::set_up).with_teardown(F::tear_down)
    }

    /// Mark the test skipped; none of its callables will run
    pub fn skip(mut self, reason: impl Into<String>) -> Self {
        self.skip = true;
        self.skip_reason = reason.into();
        self
    }

    /// `suite.name`, the identity used for filtering and reporting
    pub fn full_name(&self) -> String {
        format!("{}.{}", self.suite, self.name)
    }
}

impl fmt::Debug for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestCase")
            .field("suite", &self.suite)
            .field("name", &self.name)
            .field("has_body", &self.body.is_some())
            .field("has_setup", &self.setup.is_some())
            .field("has_teardown", &self.teardown.is_some())
            .field("skip", &self.skip)
            .field("skip_reason", &self.skip_reason)
            .finish()
    }
}

/// Insertion-ordered collection of test cases
#[derive(Debug, Default)]
pub struct TestRegistry {
    tests: Vec<TestCase>,
}

impl TestRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a test case unconditionally
    pub fn register_test(&mut self, case: TestCase) {
        self.tests.push(case);
    }

    pub fn tests(&self) -> &[TestCase] {
        &self.tests
    }

    pub fn clear(&mut self) {
        self.tests.clear();
    }

    pub fn len(&self) -> usize {
        self.tests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }
}

/// Registration-phase handle passed to each suite's `register` function
pub struct TestRegistrar<'a> {
    registry: &'a mut TestRegistry,
}

impl<'a> TestRegistrar<'a> {
    pub fn new(registry: &'a mut TestRegistry) -> Self {
        Self { registry }
    }

    /// Register a fully built case
    pub fn add(&mut self, case: TestCase) -> &mut Self {
        self.registry.register_test(case);
        self
    }

    /// Register a plain test
    pub fn test(&mut self, suite: &str, name: &str, body: impl Fn() + 'static) -> &mut Self {
        self.add(TestCase::new(suite, name, body))
    }

    /// Register a test wrapped in fixture `F`
    pub fn fixture_test<F: Fixture>(
        &mut self,
        suite: &str,
        name: &str,
        body: impl Fn() + 'static,
    ) -> &mut Self {
        self.add(TestCase::new(suite, name, body).with_fixture::<F>())
    }

    /// Register a test that is reported as skipped without running
    pub fn skipped(
        &mut self,
        suite: &str,
        name: &str,
        reason: &str,
        body: impl Fn() + 'static,
    ) -> &mut Self {
        self.add(TestCase::new(suite, name, body).skip(reason))
    }
}
