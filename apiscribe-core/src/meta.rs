use crate::descriptor::OperationDescriptor;

/// The documented route tree, in registration order.
///
/// Hosts own the table and hand it to the document assembler explicitly;
/// there is no process-wide registry. Registration order is significant:
/// it decides tie-breaks in component naming and the order of paths and
/// operations in the output.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    operations: Vec<OperationDescriptor>,
}

impl RouteTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one documented route.
    pub fn register_operation(&mut self, operation: OperationDescriptor) {
        tracing::trace!(
            method = %operation.method,
            path = %operation.path,
            "operation registered"
        );
        self.operations.push(operation);
    }

    /// Chainable form of [`register_operation`](Self::register_operation).
    pub fn with(mut self, operation: OperationDescriptor) -> Self {
        self.register_operation(operation);
        self
    }

    /// Append all routes of another table, keeping their order.
    pub fn merge(&mut self, other: RouteTable) {
        self.operations.extend(other.operations);
    }

    pub fn operations(&self) -> &[OperationDescriptor] {
        &self.operations
    }

    pub fn iter(&self) -> std::slice::Iter<'_, OperationDescriptor> {
        self.operations.iter()
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn into_operations(self) -> Vec<OperationDescriptor> {
        self.operations
    }
}

impl Extend<OperationDescriptor> for RouteTable {
    fn extend<I: IntoIterator<Item = OperationDescriptor>>(&mut self, iter: I) {
        for operation in iter {
            self.register_operation(operation);
        }
    }
}

impl FromIterator<OperationDescriptor> for RouteTable {
    fn from_iter<I: IntoIterator<Item = OperationDescriptor>>(iter: I) -> Self {
        let mut table = RouteTable::new();
        table.extend(iter);
        table
    }
}

impl<'a> IntoIterator for &'a RouteTable {
    type Item = &'a OperationDescriptor;
    type IntoIter = std::slice::Iter<'a, OperationDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.operations.iter()
    }
}
