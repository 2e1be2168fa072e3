/// Construct a [`RawBson`](crate::raw::RawBson) value from a literal.
///
/// ```
/// use bsonpath::rawbson;
///
/// let value = rawbson!({ "name": "South Pole", "temp": -57_i32, "tags": ["cold", null] });
/// ```
#[macro_export]
macro_rules! rawbson {
    (null) => {
        $crate::raw::RawBson::Null
    };
    ([$($tt:tt)*]) => {
        $crate::raw::RawBson::Array($crate::rawarr![$($tt)*])
    };
    ({$($tt:tt)*}) => {
        $crate::raw::RawBson::Document($crate::rawdoc!{$($tt)*})
    };
    ($val:expr) => {
        $crate::raw::RawBson::from($val)
    };
}

/// Construct a [`RawDocumentBuf`](crate::raw::RawDocumentBuf) from a literal. Keys must be string
/// literals; values may be expressions, `null`, or nested `{...}`/`[...]` literals.
///
/// ```
/// use bsonpath::rawdoc;
///
/// let doc = rawdoc! {
///     "crate": "bsonpath",
///     "year": 2014_i32,
/// };
/// ```
#[macro_export]
macro_rules! rawdoc {
    () => {
        $crate::raw::RawDocumentBuf::new()
    };
    ($($tt:tt)+) => {{
        let mut doc = $crate::raw::RawDocumentBuf::new();
        $crate::rawdoc_internal!(doc, $($tt)+);
        doc
    }};
}

#[doc(hidden)]
#[macro_export]
macro_rules! rawdoc_internal {
    ($doc:ident) => {};
    ($doc:ident,) => {};
    ($doc:ident, $k:literal : null $($rest:tt)*) => {
        $doc.append($crate::cstr!($k), $crate::raw::RawBson::Null);
        $crate::rawdoc_internal!($doc $($rest)*);
    };
    ($doc:ident, $k:literal : {$($m:tt)*} $($rest:tt)*) => {
        $doc.append($crate::cstr!($k), $crate::rawdoc!{$($m)*});
        $crate::rawdoc_internal!($doc $($rest)*);
    };
    ($doc:ident, $k:literal : [$($a:tt)*] $($rest:tt)*) => {
        $doc.append($crate::cstr!($k), $crate::rawarr![$($a)*]);
        $crate::rawdoc_internal!($doc $($rest)*);
    };
    ($doc:ident, $k:literal : $v:expr , $($rest:tt)*) => {
        $doc.append($crate::cstr!($k), $crate::raw::RawBson::from($v));
        $crate::rawdoc_internal!($doc, $($rest)*);
    };
    ($doc:ident, $k:literal : $v:expr) => {
        $doc.append($crate::cstr!($k), $crate::raw::RawBson::from($v));
    };
}

/// Construct a [`RawArrayBuf`](crate::raw::RawArrayBuf) from a literal.
///
/// ```
/// use bsonpath::rawarr;
///
/// let values = rawarr![1_i32, "two", null];
/// ```
#[macro_export]
macro_rules! rawarr {
    () => {
        $crate::raw::RawArrayBuf::new()
    };
    ($($tt:tt)+) => {{
        let mut arr = $crate::raw::RawArrayBuf::new();
        $crate::rawarr_internal!(arr, $($tt)+);
        arr
    }};
}

#[doc(hidden)]
#[macro_export]
macro_rules! rawarr_internal {
    ($arr:ident) => {};
    ($arr:ident,) => {};
    ($arr:ident, null $($rest:tt)*) => {
        $arr.push($crate::raw::RawBson::Null);
        $crate::rawarr_internal!($arr $($rest)*);
    };
    ($arr:ident, {$($m:tt)*} $($rest:tt)*) => {
        $arr.push($crate::rawdoc!{$($m)*});
        $crate::rawarr_internal!($arr $($rest)*);
    };
    ($arr:ident, [$($a:tt)*] $($rest:tt)*) => {
        $arr.push($crate::rawarr![$($a)*]);
        $crate::rawarr_internal!($arr $($rest)*);
    };
    ($arr:ident, $v:expr , $($rest:tt)*) => {
        $arr.push($crate::raw::RawBson::from($v));
        $crate::rawarr_internal!($arr, $($rest)*);
    };
    ($arr:ident, $v:expr) => {
        $arr.push($crate::raw::RawBson::from($v));
    };
}
