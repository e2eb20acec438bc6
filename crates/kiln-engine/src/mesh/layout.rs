/// Scalar type of a single attribute component.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ElementType {
    Byte,
    UByte,
    Short,
    UShort,
    Int,
    UInt,
    Float,
    Double,
}

impl ElementType {
    /// Size of one component in bytes.
    #[inline]
    pub const fn size(self) -> usize {
        match self {
            ElementType::Byte | ElementType::UByte => 1,
            ElementType::Short | ElementType::UShort => 2,
            ElementType::Int | ElementType::UInt | ElementType::Float => 4,
            ElementType::Double => 8,
        }
    }

    #[inline]
    pub const fn is_float(self) -> bool {
        matches!(self, ElementType::Float | ElementType::Double)
    }
}

/// One vertex attribute: `components` values of `element` type.
///
/// `normalized` asks the GPU to map integer components to `[0, 1]` / `[-1, 1]`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Attrib {
    pub components: u8,
    pub element: ElementType,
    pub normalized: bool,
}

impl Attrib {
    pub const UBYTE: Attrib = Attrib::new(1, ElementType::UByte, false);
    pub const FLOAT: Attrib = Attrib::new(1, ElementType::Float, false);
    pub const VEC2: Attrib = Attrib::new(2, ElementType::Float, false);
    pub const VEC3: Attrib = Attrib::new(3, ElementType::Float, false);
    pub const VEC4: Attrib = Attrib::new(4, ElementType::Float, false);

    #[inline]
    pub const fn new(components: u8, element: ElementType, normalized: bool) -> Self {
        Self { components, element, normalized }
    }

    /// Byte size of the attribute inside a vertex record.
    #[inline]
    pub const fn size(self) -> usize {
        self.components as usize * self.element.size()
    }

    /// Returns `true` if a write shaped like `written` fills this attribute.
    ///
    /// Only the byte size and the float/integer class are compared; signedness
    /// and normalization are GPU-side interpretations of the same bytes.
    #[inline]
    pub fn accepts(self, written: Attrib) -> bool {
        self.size() == written.size() && self.element.is_float() == written.element.is_float()
    }
}

/// Attribute with its resolved position inside the vertex record.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct LayoutEntry {
    /// Shader location (index in the layout).
    pub location: u32,
    pub attrib: Attrib,
    /// Byte offset from the start of the vertex record.
    pub offset: usize,
}

/// Ordered, immutable description of a vertex record.
///
/// `stride` is the sum of all attribute sizes; each offset is the sum of the sizes
/// of the attributes before it. An empty layout has `stride == 0`, which is a
/// caller error and not validated here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeLayout {
    attribs: Box<[Attrib]>,
    offsets: Box<[usize]>,
    stride: usize,
}

impl AttributeLayout {
    pub fn new(attribs: &[Attrib]) -> Self {
        let mut offsets = Vec::with_capacity(attribs.len());
        let mut stride = 0;
        for attrib in attribs {
            offsets.push(stride);
            stride += attrib.size();
        }

        Self {
            attribs: attribs.into(),
            offsets: offsets.into_boxed_slice(),
            stride,
        }
    }

    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.attribs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.attribs.is_empty()
    }

    #[inline]
    pub fn attribs(&self) -> &[Attrib] {
        &self.attribs
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<Attrib> {
        self.attribs.get(index).copied()
    }

    #[inline]
    pub fn offset(&self, index: usize) -> Option<usize> {
        self.offsets.get(index).copied()
    }

    /// Iterates attributes in declaration order with their locations and offsets.
    pub fn entries(&self) -> impl Iterator<Item = LayoutEntry> + '_ {
        self.attribs
            .iter()
            .zip(self.offsets.iter())
            .enumerate()
            .map(|(i, (&attrib, &offset))| LayoutEntry {
                location: i as u32,
                attrib,
                offset,
            })
    }
}
