//! 偏函数代数
//!
//! 分类规则的组合基础：一个偏函数只在谓词成立的输入上有定义。
//! 组合子：`or_else`、`and_then`、`compose`、`compose_partial`、`lift`、`logged`。

use std::marker::PhantomData;

use thiserror::Error;

/// 在未定义的输入上调用 `apply`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("partial function is not defined at the given input")]
pub struct NotDefined;

/// 装箱的偏函数，用于在运行时拼装规则链
pub type BoxPartialFunction<'a, A, B> = Box<dyn PartialFunction<A, B> + Send + Sync + 'a>;

/// 偏函数
///
/// 实现者必须保证 `try_apply(x).is_some() == is_defined_at(x)`。
pub trait PartialFunction<A: ?Sized, B> {
    /// 输入是否在定义域内（纯谓词，可重复调用）
    fn is_defined_at(&self, input: &A) -> bool;

    /// 有定义时返回变换结果，否则返回 `None`
    fn try_apply(&self, input: &A) -> Option<B>;

    /// 应用偏函数，未定义时返回 [`NotDefined`]
    fn apply(&self, input: &A) -> Result<B, NotDefined> {
        self.try_apply(input).ok_or(NotDefined)
    }

    /// 有定义时返回变换结果，否则调用 `fallback`
    fn apply_or_else<F>(&self, input: &A, fallback: F) -> B
    where
        Self: Sized,
        F: FnOnce(&A) -> B,
    {
        match self.try_apply(input) {
            Some(output) => output,
            None => fallback(input),
        }
    }

    /// 先尝试 `self`，未定义时尝试 `other`
    fn or_else<G>(self, other: G) -> OrElse<Self, G>
    where
        Self: Sized,
        G: PartialFunction<A, B>,
    {
        OrElse {
            first: self,
            second: other,
        }
    }

    /// 对结果做后处理，定义域不变
    fn and_then<C, K>(self, next: K) -> AndThen<Self, K, B>
    where
        Self: Sized,
        K: Fn(B) -> C,
    {
        AndThen {
            inner: self,
            next,
            _output: PhantomData,
        }
    }

    /// 先用全函数变换输入，再测试和应用
    fn compose<Z, K>(self, before: K) -> Compose<Self, K, A>
    where
        Self: Sized,
        A: Sized,
        Z: ?Sized,
        K: Fn(&Z) -> A,
    {
        Compose {
            inner: self,
            before,
            _input: PhantomData,
        }
    }

    /// 先用偏函数变换输入；上游未定义时整体未定义
    fn compose_partial<Z, K>(self, before: K) -> ComposePartial<Self, K, A>
    where
        Self: Sized,
        A: Sized,
        Z: ?Sized,
        K: PartialFunction<Z, A>,
    {
        ComposePartial {
            inner: self,
            before,
            _input: PhantomData,
        }
    }

    /// 转为返回 `Option` 的全函数
    fn lift<'a>(self) -> Box<dyn Fn(&A) -> Option<B> + Send + Sync + 'a>
    where
        Self: Sized + Send + Sync + 'a,
    {
        Box::new(move |input: &A| self.try_apply(input))
    }

    /// 每次应用前把输入交给 `observer`，不影响定义域与结果
    fn logged<O>(self, observer: O) -> Logged<Self, O>
    where
        Self: Sized,
        O: Fn(&A),
    {
        Logged {
            inner: self,
            observer,
        }
    }

    fn boxed<'a>(self) -> BoxPartialFunction<'a, A, B>
    where
        Self: Sized + Send + Sync + 'a,
    {
        Box::new(self)
    }
}

impl<'a, A: ?Sized, B> PartialFunction<A, B> for BoxPartialFunction<'a, A, B> {
    fn is_defined_at(&self, input: &A) -> bool {
        (**self).is_defined_at(input)
    }

    fn try_apply(&self, input: &A) -> Option<B> {
        (**self).try_apply(input)
    }

    fn apply(&self, input: &A) -> Result<B, NotDefined> {
        (**self).apply(input)
    }
}

/// 谓词 + 变换
#[derive(Clone)]
pub struct Guarded<P, T> {
    predicate: P,
    transform: T,
}

/// 由谓词和变换构造偏函数
pub fn partial<A, B, P, T>(predicate: P, transform: T) -> Guarded<P, T>
where
    A: ?Sized,
    P: Fn(&A) -> bool,
    T: Fn(&A) -> B,
{
    Guarded {
        predicate,
        transform,
    }
}

/// 处处有定义的偏函数
pub fn total<A, B, T>(transform: T) -> Guarded<fn(&A) -> bool, T>
where
    A: ?Sized,
    T: Fn(&A) -> B,
{
    fn always<A: ?Sized>(_: &A) -> bool {
        true
    }

    Guarded {
        predicate: always::<A>,
        transform,
    }
}

impl<A, B, P, T> PartialFunction<A, B> for Guarded<P, T>
where
    A: ?Sized,
    P: Fn(&A) -> bool,
    T: Fn(&A) -> B,
{
    fn is_defined_at(&self, input: &A) -> bool {
        (self.predicate)(input)
    }

    fn try_apply(&self, input: &A) -> Option<B> {
        if (self.predicate)(input) {
            Some((self.transform)(input))
        } else {
            None
        }
    }
}

/// 由返回 `Option` 的函数构造偏函数（`lift` 的逆）
#[derive(Clone)]
pub struct Unlifted<F> {
    function: F,
}

pub fn unlift<A, B, F>(function: F) -> Unlifted<F>
where
    A: ?Sized,
    F: Fn(&A) -> Option<B>,
{
    Unlifted { function }
}

impl<A, B, F> PartialFunction<A, B> for Unlifted<F>
where
    A: ?Sized,
    F: Fn(&A) -> Option<B>,
{
    fn is_defined_at(&self, input: &A) -> bool {
        (self.function)(input).is_some()
    }

    fn try_apply(&self, input: &A) -> Option<B> {
        (self.function)(input)
    }
}

#[derive(Clone)]
pub struct OrElse<F, G> {
    first: F,
    second: G,
}

impl<A, B, F, G> PartialFunction<A, B> for OrElse<F, G>
where
    A: ?Sized,
    F: PartialFunction<A, B>,
    G: PartialFunction<A, B>,
{
    fn is_defined_at(&self, input: &A) -> bool {
        self.first.is_defined_at(input) || self.second.is_defined_at(input)
    }

    fn try_apply(&self, input: &A) -> Option<B> {
        self.first
            .try_apply(input)
            .or_else(|| self.second.try_apply(input))
    }
}

pub struct AndThen<F, K, B> {
    inner: F,
    next: K,
    _output: PhantomData<fn() -> B>,
}

impl<A, B, C, F, K> PartialFunction<A, C> for AndThen<F, K, B>
where
    A: ?Sized,
    F: PartialFunction<A, B>,
    K: Fn(B) -> C,
{
    fn is_defined_at(&self, input: &A) -> bool {
        self.inner.is_defined_at(input)
    }

    fn try_apply(&self, input: &A) -> Option<C> {
        self.inner.try_apply(input).map(&self.next)
    }
}

pub struct Compose<F, K, A> {
    inner: F,
    before: K,
    _input: PhantomData<fn() -> A>,
}

impl<Z, A, B, F, K> PartialFunction<Z, B> for Compose<F, K, A>
where
    Z: ?Sized,
    F: PartialFunction<A, B>,
    K: Fn(&Z) -> A,
{
    fn is_defined_at(&self, input: &Z) -> bool {
        self.inner.is_defined_at(&(self.before)(input))
    }

    fn try_apply(&self, input: &Z) -> Option<B> {
        self.inner.try_apply(&(self.before)(input))
    }
}

pub struct ComposePartial<F, K, A> {
    inner: F,
    before: K,
    _input: PhantomData<fn() -> A>,
}

impl<Z, A, B, F, K> PartialFunction<Z, B> for ComposePartial<F, K, A>
where
    Z: ?Sized,
    F: PartialFunction<A, B>,
    K: PartialFunction<Z, A>,
{
    fn is_defined_at(&self, input: &Z) -> bool {
        self.before
            .try_apply(input)
            .is_some_and(|intermediate| self.inner.is_defined_at(&intermediate))
    }

    fn try_apply(&self, input: &Z) -> Option<B> {
        self.before
            .try_apply(input)
            .and_then(|intermediate| self.inner.try_apply(&intermediate))
    }
}

#[derive(Clone)]
pub struct Logged<F, O> {
    inner: F,
    observer: O,
}

impl<A, B, F, O> PartialFunction<A, B> for Logged<F, O>
where
    A: ?Sized,
    F: PartialFunction<A, B>,
    O: Fn(&A),
{
    fn is_defined_at(&self, input: &A) -> bool {
        self.inner.is_defined_at(input)
    }

    fn try_apply(&self, input: &A) -> Option<B> {
        (self.observer)(input);
        self.inner.try_apply(input)
    }

    fn apply(&self, input: &A) -> Result<B, NotDefined> {
        (self.observer)(input);
        self.inner.apply(input)
    }
}
