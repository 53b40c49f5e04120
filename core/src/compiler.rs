//! The struct compiler: turns a base chain, a list of declared fields, and a
//! [`LayoutFlags`] bitset into an immutable, offset-resolved layout.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use log::{debug, trace};

use crate::error::CompileError;
use crate::field::{FieldInfo, PADDING_PREFIX};
use crate::flags::{FieldFlags, LayoutFlags};
use crate::types::{Size, Type};

/// A fully compiled, immutable struct layout. Cheap to share: build once,
/// wrap in `Arc`, and hand the same layout to every [`crate::codec::Instance`].
#[derive(Clone, Debug)]
pub struct CompiledStruct {
    pub name: String,
    pub fields: Vec<FieldInfo>,
    pub size: Size,
    pub alignment: usize,
    pub flags: LayoutFlags,
    pub bases: Vec<Arc<CompiledStruct>>,
}

impl PartialEq for CompiledStruct {
    /// Two compiled layouts are equal when they share a name and an
    /// identical resolved field list; flags and base chain are compilation
    /// inputs already baked into `fields`, not independent identity.
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.fields == other.fields
    }
}

impl CompiledStruct {
    /// User-visible fields in compiled order, excluding synthetic padding.
    pub fn user_fields(&self) -> impl Iterator<Item = &FieldInfo> {
        self.fields.iter().filter(|f| !f.is_padding())
    }

    pub fn field(&self, name: &str) -> Option<&FieldInfo> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn is_final(&self) -> bool {
        self.flags.contains(LayoutFlags::FINAL)
    }
}

static PADDING_COUNTER: AtomicU64 = AtomicU64::new(0);

fn padding_name() -> String {
    format!("{PADDING_PREFIX}{}", PADDING_COUNTER.fetch_add(1, Ordering::Relaxed))
}

/// Fluent entry point for the compiler: `StructBuilder::new(name).field(...).build()`.
pub struct StructBuilder {
    name: String,
    bases: Vec<Arc<CompiledStruct>>,
    declared: Vec<FieldInfo>,
    flags: LayoutFlags,
}

impl StructBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        StructBuilder {
            name: name.into(),
            bases: Vec::new(),
            declared: Vec::new(),
            flags: LayoutFlags::default(),
        }
    }

    pub fn base(mut self, base: Arc<CompiledStruct>) -> Self {
        self.bases.push(base);
        self
    }

    pub fn field(mut self, name: impl Into<String>, ty: Type) -> Self {
        self.declared.push(FieldInfo::new(name, ty));
        self
    }

    pub fn flags(mut self, flags: LayoutFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn build(self) -> Result<Arc<CompiledStruct>, CompileError> {
        let StructBuilder {
            name,
            bases,
            mut declared,
            flags,
        } = self;

        for f in &declared {
            if f.name.is_empty() {
                return Err(CompileError::EmptyName);
            }
        }
        if flags.how_many_alignment_modes_set() > 1 {
            return Err(CompileError::ConflictingAlignment);
        }

        // Step 1: inheritance check + concatenation in MRO order.
        for base in &bases {
            if base.is_final() {
                return Err(CompileError::Inheritance(base.name.clone()));
            }
        }
        if flags.contains(LayoutFlags::PROTECTED) {
            for f in &mut declared {
                f.flags |= FieldFlags::PROTECTED;
            }
        }

        let mut concatenated: Vec<FieldInfo> = Vec::new();
        for base in &bases {
            concatenated.extend(base.user_fields().cloned());
        }
        concatenated.extend(declared);

        // Step 2: override resolution, preserving the later declaration position.
        let mut ordered: Vec<FieldInfo> = Vec::new();
        for incoming in concatenated {
            match ordered.iter().position(|g| g.name == incoming.name) {
                None => ordered.push(incoming),
                Some(idx) => {
                    let existing = &ordered[idx];
                    if existing.is_protected() {
                        return Err(CompileError::UnoverridableField(incoming.name));
                    }
                    if flags.contains(LayoutFlags::TYPE_SAFE_OVERRIDE)
                        && existing.ty != incoming.ty
                    {
                        return Err(CompileError::UnsafeOverride {
                            name: incoming.name,
                            base_type: existing.ty.clone(),
                            new_type: incoming.ty,
                        });
                    }
                    if !flags.contains(LayoutFlags::ALLOW_OVERRIDE) {
                        return Err(CompileError::Override(incoming.name));
                    }
                    debug!("field `{}` overridden, keeping later declaration position", incoming.name);
                    ordered.remove(idx);
                    ordered.push(incoming);
                }
            }
        }

        // Step 3: reorder.
        if flags.contains(LayoutFlags::REORDER_FIELDS) {
            let (mut sized, dynamic): (Vec<_>, Vec<_>) = ordered
                .into_iter()
                .partition(|f| !f.ty.size().is_dynamic());
            sized.sort_by(|a, b| b.ty.size().fixed().cmp(&a.ty.size().fixed()));
            ordered = sized;
            ordered.extend(dynamic);
        }

        // Step 4: alignment pass.
        let has_dynamic = ordered.iter().any(|f| f.ty.size().is_dynamic());
        if !flags.no_alignment() && !has_dynamic {
            let explicit = flags.explicit_alignment();
            let mut offset = 0usize;
            let mut with_padding: Vec<FieldInfo> = Vec::with_capacity(ordered.len());
            let mut max_alignment = 1usize;

            for mut f in ordered {
                // An explicit `AlignN` caps a field's alignment requirement
                // at N rather than forcing every field up to N (matching
                // how a C `pack(N)` pragma behaves): a field less strictly
                // aligned than N keeps its own natural alignment.
                let a = match explicit {
                    Some(n) => n.min(f.ty.alignment()),
                    None => f.ty.alignment(),
                };
                max_alignment = max_alignment.max(a);
                let pad = offset.wrapping_neg() & (a - 1);
                if pad > 0 {
                    trace!("inserting {} byte(s) of padding before `{}`", pad, f.name);
                    let pad_field = FieldInfo::new(padding_name(), Type::Padding(pad));
                    offset += pad;
                    with_padding.push(pad_field);
                }
                f.offset = offset;
                offset += f.ty.size().fixed().expect("checked above: no dynamic fields");
                with_padding.push(f);
            }

            let trailing_alignment = explicit.unwrap_or(max_alignment);
            let trailing_pad = offset.wrapping_neg() & (trailing_alignment.max(1) - 1);
            if trailing_pad > 0 && !with_padding.is_empty() {
                trace!("appending {} byte(s) of trailing padding", trailing_pad);
                with_padding.push(FieldInfo::new(padding_name(), Type::Padding(trailing_pad)));
                offset += trailing_pad;
            }
            ordered = with_padding;
            debug!(
                "struct `{}` laid out: {} field(s), size {}",
                name,
                ordered.len(),
                offset
            );
        } else {
            // No alignment pass: offsets are simply cumulative, meaningless
            // once a dynamic field appears.
            let mut offset = 0usize;
            for f in ordered.iter_mut() {
                f.offset = offset;
                if let Some(n) = f.ty.size().fixed() {
                    offset += n;
                }
            }
        }

        // Step 6: size determination.
        let size = if ordered.iter().any(|f| f.ty.size().is_dynamic()) {
            Size::Dynamic
        } else {
            Size::Fixed(ordered.iter().map(|f| f.ty.size().fixed().unwrap()).sum())
        };
        if flags.contains(LayoutFlags::FIXED_SIZE) && size.is_dynamic() {
            return Err(CompileError::Size);
        }

        let alignment = ordered.iter().map(|f| f.ty.alignment()).max().unwrap_or(1);

        Ok(Arc::new(CompiledStruct {
            name,
            fields: ordered,
            size,
            alignment,
            flags,
            bases,
        }))
    }
}
