use crate::error::ConstructionError;
use crate::function::FunctionId;

//

/// Index of a basis vector.
/// 
/// Indices are handed out in registration order and are used as is
/// as row and column coordinates of the Gram matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BasisIndex(pub(crate) usize);

impl BasisIndex
{
    /// Position in the registry.
    pub fn get(&self) -> usize
    {
        self.0
    }
}

impl core::fmt::Display for BasisIndex {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "b{}", self.0)
    }
}

/// Where a basis vector comes from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BasisOrigin
{
    /// Starting point of a method.
    InitialPoint,
    /// Stationary point of a function.
    StationaryPoint { function: FunctionId },
    /// Gradient, subgradient or operator output of a function.
    Gradient { function: FunctionId },
}

impl core::fmt::Display for BasisOrigin {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match &self {
            BasisOrigin::InitialPoint => write!(f, "initial point"),
            BasisOrigin::StationaryPoint { function } => write!(f, "stationary point of {}", function),
            BasisOrigin::Gradient { function } => write!(f, "gradient of {}", function),
        }
    }
}

//

/// Basis registry
/// 
/// Monotonically growing set of independent directions.
/// Nothing is ever removed.
#[derive(Debug, Clone)]
pub struct BasisRegistry
{
    origins: Vec<BasisOrigin>,
    capacity: usize,
}

impl BasisRegistry
{
    /// Creates an empty registry.
    /// 
    /// * `capacity` is the largest number of basis vectors accepted.
    pub fn new(capacity: usize) -> Self
    {
        BasisRegistry {
            origins: Vec::new(),
            capacity,
        }
    }

    /// Registers a new basis vector.
    /// 
    /// Returns the index of the new vector,
    /// or `Err` if the registry is full.
    pub fn register(&mut self, origin: BasisOrigin) -> Result<BasisIndex, ConstructionError>
    {
        if self.origins.len() >= self.capacity {
            log::error!("basis capacity {} exceeded registering {}", self.capacity, origin);
            return Err(ConstructionError::BasisCapacity { capacity: self.capacity });
        }

        let index = BasisIndex(self.origins.len());
        log::trace!("register {}: {}", index, origin);
        self.origins.push(origin);

        Ok(index)
    }

    /// Number of registered basis vectors.
    pub fn len(&self) -> usize
    {
        self.origins.len()
    }

    pub fn is_empty(&self) -> bool
    {
        self.origins.is_empty()
    }

    pub fn contains(&self, index: BasisIndex) -> bool
    {
        index.0 < self.origins.len()
    }

    /// Origin of a registered basis vector.
    /// 
    /// Returns `None` if `index` is not registered.
    pub fn origin(&self, index: BasisIndex) -> Option<BasisOrigin>
    {
        self.origins.get(index.0).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item=(BasisIndex, BasisOrigin)> + '_
    {
        self.origins.iter().enumerate().map(|(i, o)| (BasisIndex(i), *o))
    }
}

//

/// Index of a function value.
/// 
/// One value is registered per distinct pair of a leaf function and a point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ValueIndex(pub(crate) usize);

impl ValueIndex
{
    /// Position in the value basis.
    pub fn get(&self) -> usize
    {
        self.0
    }
}

impl core::fmt::Display for ValueIndex {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "v{}", self.0)
    }
}

//

#[test]
fn test_registry_capacity()
{
    let mut reg = BasisRegistry::new(2);

    let b0 = reg.register(BasisOrigin::InitialPoint).unwrap();
    let b1 = reg.register(BasisOrigin::InitialPoint).unwrap();
    assert_eq!((b0.get(), b1.get()), (0, 1));
    assert!(reg.contains(b1));

    let e = reg.register(BasisOrigin::InitialPoint).unwrap_err();
    assert_eq!(e, ConstructionError::BasisCapacity { capacity: 2 });
    assert_eq!(reg.len(), 2);
}
