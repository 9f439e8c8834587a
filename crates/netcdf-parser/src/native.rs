//! Low-level helpers around the native netcdf library.
//!
//! The netcdf crate wraps libnetcdf/HDF5. Two things live here: silencing
//! HDF5's diagnostic printing, and widening `netcdf::AttributeValue` into
//! [`AttrValue`] so that attributes can be compared against configuration.

use std::sync::Once;

use quicklook_common::AttrValue;

/// Silence HDF5's automatic error printing to stderr.
///
/// The HDF5 C library prints verbose error messages to stderr even when errors
/// are handled gracefully by the Rust code (e.g., when checking for optional
/// attributes that don't exist). This creates confusing log spam like:
///
/// ```text
/// HDF5-DIAG: Error detected in HDF5 (1.10.8) thread 3:
///   #003: ../../../src/H5Adense.c line 397 in H5A__dense_open(): can't locate attribute in name index
/// ```
///
/// It only needs to be called once per process, but is safe to call multiple
/// times. [`crate::open_dataset`] calls it before every open.
pub fn silence_hdf5_errors() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        // SAFETY: H5Eset_auto2 is thread-safe and we're passing null pointers
        // to disable error output, which is a documented valid use.
        unsafe {
            hdf5_metno_sys::h5e::H5Eset_auto2(
                hdf5_metno_sys::h5e::H5E_DEFAULT,
                None,
                std::ptr::null_mut(),
            );
        }
    });
}

/// Widen a netcdf attribute value.
///
/// Single-element arrays collapse to scalars, which is how IOAPI writers
/// store most of their global attributes.
pub(crate) fn widen_attribute(value: netcdf::AttributeValue) -> AttrValue {
    use netcdf::AttributeValue as V;

    fn ints<T: Into<i64>>(v: Vec<T>) -> AttrValue {
        collapse(v.into_iter().map(|x| AttrValue::Int(x.into())).collect())
    }
    fn floats<T: Into<f64>>(v: Vec<T>) -> AttrValue {
        collapse(v.into_iter().map(|x| AttrValue::Float(x.into())).collect())
    }

    match value {
        V::Uchar(v) => AttrValue::Int(v.into()),
        V::Schar(v) => AttrValue::Int(v.into()),
        V::Ushort(v) => AttrValue::Int(v.into()),
        V::Short(v) => AttrValue::Int(v.into()),
        V::Uint(v) => AttrValue::Int(v.into()),
        V::Int(v) => AttrValue::Int(v.into()),
        V::Longlong(v) => AttrValue::Int(v),
        V::Ulonglong(v) => AttrValue::Int(v as i64),
        V::Float(v) => AttrValue::Float(v.into()),
        V::Double(v) => AttrValue::Float(v),
        V::Str(s) => AttrValue::Text(s),
        V::Uchars(v) => ints(v),
        V::Schars(v) => ints(v),
        V::Ushorts(v) => ints(v),
        V::Shorts(v) => ints(v),
        V::Uints(v) => ints(v),
        V::Ints(v) => ints(v),
        V::Longlongs(v) => ints(v),
        V::Floats(v) => floats(v),
        V::Doubles(v) => floats(v),
        V::Strs(v) => collapse(v.into_iter().map(AttrValue::Text).collect()),
        other => AttrValue::Text(format!("{:?}", other)),
    }
}

fn collapse(mut items: Vec<AttrValue>) -> AttrValue {
    if items.len() == 1 {
        items.remove(0)
    } else {
        AttrValue::List(items)
    }
}

/// Check if a variable has an attribute with the given name.
/// This avoids HDF5 error spam when checking for optional attributes.
pub(crate) fn has_attr(var: &netcdf::Variable, name: &str) -> bool {
    var.attributes().any(|attr| attr.name() == name)
}

/// Helper to get a numeric variable attribute as f64.
pub(crate) fn get_f64_attr(var: &netcdf::Variable, name: &str) -> Option<f64> {
    if !has_attr(var, name) {
        return None;
    }
    let attr_value = var.attribute_value(name)?.ok()?;
    widen_attribute(attr_value).as_f64()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_widen_scalars() {
        assert_eq!(widen_attribute(netcdf::AttributeValue::Short(-3)), AttrValue::Int(-3));
        assert_eq!(
            widen_attribute(netcdf::AttributeValue::Double(3000.0)),
            AttrValue::Float(3000.0)
        );
        assert_eq!(
            widen_attribute(netcdf::AttributeValue::Str("AKFB".into())),
            AttrValue::Text("AKFB".into())
        );
    }

    #[test]
    fn test_single_element_arrays_collapse() {
        assert_eq!(
            widen_attribute(netcdf::AttributeValue::Floats(vec![65.0])),
            AttrValue::Float(65.0)
        );
        assert_eq!(
            widen_attribute(netcdf::AttributeValue::Ints(vec![1, 2])),
            AttrValue::List(vec![AttrValue::Int(1), AttrValue::Int(2)])
        );
    }
}
